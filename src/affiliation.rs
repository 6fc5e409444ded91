//! Survey domain: the answer vector and the party labels it predicts.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Error;

/// Answers per completed survey (the feature count `M`).
pub const SURVEY_FEATURES: usize = 12;

/// Number of party labels (the class count `K`).
pub const NUM_AFFILIATIONS: usize = 4;

/// Answer options per question; answers are coded `1..=options`.
///
/// Questions 0-2 cover voting habits and party representation, 3-8 rate how big
/// a problem an issue is, and 9-11 rate how important an issue is.
pub const SURVEY_ANSWER_OPTIONS: [usize; SURVEY_FEATURES] = [4, 4, 2, 3, 3, 3, 3, 3, 3, 3, 3, 3];

/// Check that `answers` is a complete survey with every answer in range.
pub fn validate_answers(answers: &[f64]) -> Result<(), Error> {
    if answers.len() != SURVEY_FEATURES {
        return Err(Error::InvalidConfig(format!(
            "survey has {} answers, expected {SURVEY_FEATURES}",
            answers.len()
        )));
    }
    for (i, (&answer, &options)) in answers.iter().zip(&SURVEY_ANSWER_OPTIONS).enumerate() {
        if answer.fract() != 0.0 || answer < 1.0 || answer > options as f64 {
            return Err(Error::InvalidData(format!(
                "answer {i} is {answer}, expected an integer in 1..={options}"
            )));
        }
    }
    Ok(())
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Affiliation {
    Democrat,
    Republican,
    Independent,
    ThirdPartyOther,
}

impl Affiliation {
    /// All labels in label-code order.
    pub const ALL: [Affiliation; NUM_AFFILIATIONS] = [
        Affiliation::Democrat,
        Affiliation::Republican,
        Affiliation::Independent,
        Affiliation::ThirdPartyOther,
    ];

    #[inline]
    pub fn code(self) -> usize {
        match self {
            Affiliation::Democrat => 0,
            Affiliation::Republican => 1,
            Affiliation::Independent => 2,
            Affiliation::ThirdPartyOther => 3,
        }
    }
}

impl TryFrom<usize> for Affiliation {
    type Error = Error;

    fn try_from(code: usize) -> Result<Self, Self::Error> {
        Affiliation::ALL
            .get(code)
            .copied()
            .ok_or(Error::LabelOutOfRange {
                label: code,
                num_classes: NUM_AFFILIATIONS,
            })
    }
}

impl From<Affiliation> for usize {
    fn from(value: Affiliation) -> Self {
        value.code()
    }
}

impl fmt::Display for Affiliation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Affiliation::Democrat => "Democrat",
            Affiliation::Republican => "Republican",
            Affiliation::Independent => "Independent",
            Affiliation::ThirdPartyOther => "Third party / other",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_all() {
        for (i, a) in Affiliation::ALL.iter().enumerate() {
            assert_eq!(a.code(), i);
            assert_eq!(Affiliation::try_from(i).unwrap(), *a);
        }
    }

    #[test]
    fn unknown_code_is_out_of_range() {
        assert_eq!(
            Affiliation::try_from(4).unwrap_err(),
            Error::LabelOutOfRange {
                label: 4,
                num_classes: 4
            }
        );
    }

    #[test]
    fn answers_are_range_checked() {
        let mut answers = [1.0; SURVEY_FEATURES];
        assert!(validate_answers(&answers).is_ok());
        answers[2] = 3.0;
        assert!(matches!(
            validate_answers(&answers),
            Err(Error::InvalidData(_))
        ));
        answers[2] = 1.5;
        assert!(validate_answers(&answers).is_err());
        assert!(matches!(
            validate_answers(&[1.0; 11]),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn severity_weighting_fits_the_survey() {
        let columns = crate::FeatureWeighting::survey().columns();
        assert!(columns.end <= SURVEY_FEATURES);
    }
}
