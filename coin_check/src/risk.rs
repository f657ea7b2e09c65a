use abi::{RelationshipVerdict, RiskAssessment, RiskLevel, TokenProfile};
use chrono::{NaiveDate, Utc};
use log::debug;

pub const VERY_RECENT_DAYS: i64 = 3;
pub const NEW_TOKEN_DAYS: i64 = 7;
pub const LOW_VOLUME_TXS: u64 = 10;

/// Heuristic risk level. Each rule appends a factor and can only raise the level.
#[derive(Debug, Clone, Copy)]
pub struct RiskScorer {
    today: NaiveDate,
}

impl RiskScorer {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Scores against the current UTC date.
    pub fn today() -> Self {
        Self::new(Utc::now().date_naive())
    }

    /// `deploy_date` is `YYYY-MM-DD`; an unparsable date skips the age rules.
    pub fn score(
        &self,
        profile: &TokenProfile,
        relationship: Option<&RelationshipVerdict>,
        deploy_date: Option<&str>,
    ) -> RiskAssessment {
        let mut assessment = RiskAssessment::default();

        if let Some(age) = deploy_date.and_then(|date| self.age_in_days(date)) {
            if age < VERY_RECENT_DAYS {
                raise(&mut assessment, RiskLevel::High, "Very recent token (less than 3 days old)");
            } else if age < NEW_TOKEN_DAYS {
                raise(&mut assessment, RiskLevel::Medium, "New token (less than 7 days old)");
            }
        }

        if relationship.is_some_and(|verdict| verdict.related) {
            raise(
                &mut assessment,
                RiskLevel::Medium,
                "Related addresses detected between deployer and early interactors",
            );
        }

        if profile.transaction_count < LOW_VOLUME_TXS {
            raise(&mut assessment, RiskLevel::Medium, "Low transaction volume");
        }

        assessment
    }

    fn age_in_days(&self, date: &str) -> Option<i64> {
        match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            Ok(deployed) => Some((self.today - deployed).num_days()),
            Err(e) => {
                debug!("ignoring unparsable deploy date {:?}: {}", date, e);
                None
            }
        }
    }
}

fn raise(assessment: &mut RiskAssessment, level: RiskLevel, factor: &str) {
    assessment.level = assessment.level.max(level);
    assessment.factors.push(factor.to_string());
}
