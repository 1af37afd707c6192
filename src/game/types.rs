use serde::{Deserialize, Serialize};

/// Symbol a seat plays under during one round. `X` always opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn other(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    Win(Mark),
    Draw,
}

impl RoundOutcome {
    pub fn winner(self) -> Option<Mark> {
        match self {
            RoundOutcome::Win(mark) => Some(mark),
            RoundOutcome::Draw => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_serialize_as_letters() {
        assert_eq!(serde_json::to_string(&Mark::X).unwrap(), r#""X""#);
        assert_eq!(serde_json::to_string(&Mark::O).unwrap(), r#""O""#);
        assert_eq!(Mark::X.other(), Mark::O);
    }
}
