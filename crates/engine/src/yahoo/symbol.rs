use common::{Error, Result};

/// Map a pair identifier to its Yahoo Finance ticker.
///
/// Gold trades as the COMEX future; every other pair is a Yahoo FX cross
/// (`EURUSD` -> `EURUSD=X`). Separators and case are normalised first.
pub fn yahoo_symbol(pair: &str) -> Result<String> {
    let pair: String = pair
        .chars()
        .filter(|c| !matches!(c, '/' | '-' | '_' | ' '))
        .collect::<String>()
        .to_uppercase();

    if pair.is_empty() {
        return Err(Error::MalformedRequest("pair must not be empty".into()));
    }
    if !pair.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::MalformedRequest(format!(
            "pair '{pair}' contains unsupported characters"
        )));
    }

    Ok(match pair.as_str() {
        "XAUUSD" => "GC=F".to_string(),
        _ => format!("{pair}=X"),
    })
}
