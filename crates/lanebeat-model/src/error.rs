use thiserror::Error;

/// Errors raised while parsing chart text. All of them abort session setup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartError {
    #[error("lane count must be at least 1")]
    InvalidLaneCount,

    #[error("malformed header at line {line}: invalid {field}")]
    MalformedHeader { line: usize, field: &'static str },

    #[error("malformed row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },
}

impl ChartError {
    /// Source line the error points at, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            ChartError::InvalidLaneCount => None,
            ChartError::MalformedHeader { line, .. } | ChartError::MalformedRow { line, .. } => {
                Some(*line)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_line() {
        let err = ChartError::MalformedHeader {
            line: 5,
            field: "bpm",
        };
        assert_eq!(err.to_string(), "malformed header at line 5: invalid bpm");
        assert_eq!(err.line(), Some(5));

        let err = ChartError::MalformedRow {
            line: 12,
            reason: "bad lane value `x`".to_string(),
        };
        assert!(err.to_string().contains("line 12"));
        assert_eq!(ChartError::InvalidLaneCount.line(), None);
    }
}
