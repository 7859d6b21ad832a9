#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CorrectMoveResults {
    Ok,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IncorrectMoveResults {
    KingStillChecked,
    NoPieceAtLocation,
    IllegalMove,
    CastlingNotAllowed,
    PromotionExpected,
    IllegalPromotion,
}

pub type MoveResult = Result<CorrectMoveResults, IncorrectMoveResults>;
