//! Compound over/under notation, e.g. `OU (2U,1O)`.

/// Which side of threshold a compound term sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternSide {
    Under,
    Over,
}

impl PatternSide {
    pub fn label(&self) -> &'static str {
        match self {
            PatternSide::Under => "under",
            PatternSide::Over => "over",
        }
    }
}

/// One `<minutes><U|O>` term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternTerm {
    pub minutes: u32,
    pub side: PatternSide,
}

/// Longest accepted term, in minutes.
pub const MAX_TERM_MINUTES: u32 = 24 * 60;

/// Parse an over/under token into its terms.
///
/// A pattern has exactly one under term and one over term, in either
/// order. Returns `None` when the token is not an `OU(...)` pattern at all
/// or a term is malformed. Matching ignores case and whitespace.
pub fn parse_over_under(token: &str) -> Option<Vec<PatternTerm>> {
    let compact: String = token
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    let inner = compact.strip_prefix("OU(")?.strip_suffix(')')?;
    if inner.is_empty() {
        return None;
    }

    let mut terms = Vec::new();
    for raw in inner.split(',') {
        let side = match raw.chars().last()? {
            'U' => PatternSide::Under,
            'O' => PatternSide::Over,
            _ => return None,
        };
        let digits = &raw[..raw.len() - 1];
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let minutes: u32 = digits.parse().ok()?;
        if minutes == 0 || minutes > MAX_TERM_MINUTES {
            return None;
        }
        terms.push(PatternTerm { minutes, side });
    }

    let unders = terms.iter().filter(|t| t.side == PatternSide::Under).count();
    let overs = terms.iter().filter(|t| t.side == PatternSide::Over).count();
    if unders != 1 || overs != 1 {
        return None;
    }

    Some(terms)
}

/// Canonical display form of a set of terms, e.g. `OU (2U,1O)`.
pub fn canonical_code(terms: &[PatternTerm]) -> String {
    let body: Vec<String> = terms
        .iter()
        .map(|t| {
            let suffix = match t.side {
                PatternSide::Under => 'U',
                PatternSide::Over => 'O',
            };
            format!("{}{}", t.minutes, suffix)
        })
        .collect();
    format!("OU ({})", body.join(","))
}
