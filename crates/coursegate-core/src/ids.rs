//! Strongly typed identifiers.
//!
//! Every entity the engine touches is keyed by a numeric id handed out by the
//! persistence layer. Wrapping them keeps a lesson id from being passed where a
//! quiz id is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Returns the underlying numeric value.
            pub fn value(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map($name)
                    .map_err(|_| format!("invalid {}: '{}'", stringify!($name), s))
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                $name(value)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a course.
    CourseId
);
numeric_id!(
    /// Identifier of a module within a course.
    ModuleId
);
numeric_id!(
    /// Identifier of a lesson within a module.
    LessonId
);
numeric_id!(
    /// Identifier of a quiz (course-level or lesson-level exam).
    QuizId
);
numeric_id!(
    /// Identifier of a question within a quiz.
    QuestionId
);
numeric_id!(
    /// Identifier of an alternative within a question.
    AlternativeId
);
numeric_id!(
    /// Identifier of a learner.
    LearnerId
);

/// Identifier of a persisted attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttemptId(pub Uuid);

impl AttemptId {
    pub fn new_v4() -> Self {
        AttemptId(Uuid::new_v4())
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_parse() {
        assert_eq!(LessonId(42).to_string(), "42");
        assert_eq!(" 7 ".parse::<LearnerId>().unwrap(), LearnerId(7));
        assert!("abc".parse::<QuizId>().is_err());
    }

    #[test]
    fn serializes_as_bare_number() {
        let json = serde_json::to_string(&QuestionId(10)).unwrap();
        assert_eq!(json, "10");
        let id: AlternativeId = serde_json::from_str("3").unwrap();
        assert_eq!(id, AlternativeId(3));
    }
}
