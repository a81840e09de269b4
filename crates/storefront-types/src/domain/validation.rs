use serde::Serialize;

/// Local form validation failure. Lists every required field that was empty
/// after trimming, in form order.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{} required", describe(.missing))]
pub struct ValidationError {
    pub missing: Vec<&'static str>,
}

impl ValidationError {
    /// Collects the labels whose value is blank. Returns `Ok(())` when none are.
    pub fn check(fields: &[(&'static str, &str)]) -> Result<(), Self> {
        let missing: Vec<&'static str> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(label, _)| *label)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Self { missing })
        }
    }
}

fn describe(missing: &[&'static str]) -> String {
    match missing {
        [] => "nothing".into(),
        [one] => (*one).to_string(),
        [rest @ .., last] => {
            let head = rest.join(", ");
            if rest.len() > 1 {
                format!("{head}, and {last}")
            } else {
                format!("{head} and {last}")
            }
        }
    }
}
