use std::fmt;
use std::str::FromStr;

use crate::error::SimilarityError;
use crate::models::{RawMatch, ResultShape, SimilarityResult};

/// A content partition with its own vector index and response vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// Vehicle-repair problems.
    AutoInsider,
    /// Travel points of interest.
    EuropeanRailGuide,
}

impl Domain {
    pub const ALL: [Domain; 2] = [Domain::AutoInsider, Domain::EuropeanRailGuide];

    pub fn index_name(&self) -> &'static str {
        match self {
            Domain::AutoInsider => "autoinsider-similar-problems",
            Domain::EuropeanRailGuide => "erg-similar-places",
        }
    }

    /// Short name used on the command line and in logs.
    pub fn slug(&self) -> &'static str {
        match self {
            Domain::AutoInsider => "autoinsider",
            Domain::EuropeanRailGuide => "erg",
        }
    }

    /// Route prefix; `/index`, `/store` and `/delete` hang off it.
    pub fn base_path(&self) -> &'static str {
        match self {
            Domain::AutoInsider => "/autoinsider/similar/problems",
            Domain::EuropeanRailGuide => "/europeanrailguide/similar/places",
        }
    }

    /// Name of the query-string parameter carrying the text, echoed back in
    /// the response under the same key.
    pub fn query_param(&self) -> &'static str {
        match self {
            Domain::AutoInsider => "question",
            Domain::EuropeanRailGuide => "query",
        }
    }

    pub fn list_key(&self) -> &'static str {
        match self {
            Domain::AutoInsider => "similar-questions",
            Domain::EuropeanRailGuide => "similar-places",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Domain::AutoInsider => "AutoInsider Problem Fix ML Service",
            Domain::EuropeanRailGuide => "European Rail Guide Similar Place Service",
        }
    }

    pub fn missing_query_message(&self) -> &'static str {
        match self {
            Domain::AutoInsider => "Client error: No question provided",
            Domain::EuropeanRailGuide => "Client error: No query provided",
        }
    }

    pub fn shape(&self) -> ResultShape {
        match self {
            Domain::AutoInsider => ResultShape {
                id_field: "ai_id",
                title_field: "problem_title",
            },
            Domain::EuropeanRailGuide => ResultShape {
                id_field: "erg_id",
                title_field: "place_name",
            },
        }
    }

    /// Shape a raw index hit; a missing title becomes empty.
    pub fn transform_result(&self, raw: &RawMatch) -> SimilarityResult {
        SimilarityResult {
            id: raw.id.clone(),
            title: raw.title.clone().unwrap_or_default(),
            score: raw.score,
            shape: self.shape(),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Domain {
    type Err = SimilarityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "autoinsider" | "ai" => Ok(Domain::AutoInsider),
            "erg" | "europeanrailguide" => Ok(Domain::EuropeanRailGuide),
            other => Err(SimilarityError::Validation(format!(
                "Unknown domain '{}', expected one of: autoinsider, erg",
                other
            ))),
        }
    }
}
