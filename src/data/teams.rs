//! Team abbreviation resolver
//!
//! Maps free-text MLB team names (full names, nicknames, historical names and
//! common alternate codes) to one canonical short code.

use crate::error::{PipelineError, Result};

/// Canonical codes for all 30 clubs
pub const TEAM_CODES: [&str; 30] = [
    "ARI", "ATL", "BAL", "BOS", "CHC", "CWS", "CIN", "CLE", "COL", "DET", "HOU", "KC", "LAA",
    "LAD", "MIA", "MIL", "MIN", "NYM", "NYY", "OAK", "PHI", "PIT", "SD", "SF", "SEA", "STL", "TB",
    "TEX", "TOR", "WSH",
];

/// Lowercase, drop periods, collapse whitespace
fn normalize(name: &str) -> String {
    name.replace('.', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Resolve a team name to its canonical code
pub fn resolve_team(name: &str) -> Option<&'static str> {
    let key = normalize(name);
    let code = match key.as_str() {
        "arizona diamondbacks" | "diamondbacks" | "arizona" | "ari" | "az" => "ARI",
        "atlanta braves" | "braves" | "atlanta" | "atl" => "ATL",
        "baltimore orioles" | "orioles" | "baltimore" | "bal" => "BAL",
        "boston red sox" | "red sox" | "boston" | "bos" => "BOS",
        "chicago cubs" | "cubs" | "chc" => "CHC",
        "chicago white sox" | "white sox" | "cws" | "chw" => "CWS",
        "cincinnati reds" | "reds" | "cincinnati" | "cin" => "CIN",
        "cleveland guardians" | "cleveland indians" | "guardians" | "indians" | "cleveland"
        | "cle" => "CLE",
        "colorado rockies" | "rockies" | "colorado" | "col" => "COL",
        "detroit tigers" | "tigers" | "detroit" | "det" => "DET",
        "houston astros" | "astros" | "houston" | "hou" => "HOU",
        "kansas city royals" | "royals" | "kansas city" | "kc" | "kcr" => "KC",
        "los angeles angels" | "los angeles angels of anaheim" | "anaheim angels" | "angels"
        | "laa" | "ana" => "LAA",
        "los angeles dodgers" | "dodgers" | "lad" => "LAD",
        "miami marlins" | "florida marlins" | "marlins" | "miami" | "mia" | "fla" => "MIA",
        "milwaukee brewers" | "brewers" | "milwaukee" | "mil" => "MIL",
        "minnesota twins" | "twins" | "minnesota" | "min" => "MIN",
        "new york mets" | "mets" | "nym" => "NYM",
        "new york yankees" | "yankees" | "nyy" => "NYY",
        "oakland athletics" | "athletics" | "oakland" | "oak" | "ath" => "OAK",
        "philadelphia phillies" | "phillies" | "philadelphia" | "phi" => "PHI",
        "pittsburgh pirates" | "pirates" | "pittsburgh" | "pit" => "PIT",
        "san diego padres" | "padres" | "san diego" | "sd" | "sdp" => "SD",
        "san francisco giants" | "giants" | "san francisco" | "sf" | "sfg" => "SF",
        "seattle mariners" | "mariners" | "seattle" | "sea" => "SEA",
        "st louis cardinals" | "saint louis cardinals" | "cardinals" | "st louis" | "stl" => "STL",
        "tampa bay rays" | "tampa bay devil rays" | "rays" | "tampa bay" | "tb" | "tbr" => "TB",
        "texas rangers" | "rangers" | "texas" | "tex" => "TEX",
        "toronto blue jays" | "blue jays" | "toronto" | "tor" => "TOR",
        "washington nationals" | "nationals" | "washington" | "wsh" | "was" | "wsn" => "WSH",
        _ => return None,
    };
    Some(code)
}

/// Resolve or fail with a validation error naming the input
pub fn require_team(name: &str) -> Result<&'static str> {
    resolve_team(name)
        .ok_or_else(|| PipelineError::Validation(format!("Unknown team name: {:?}", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_full_names() {
        assert_eq!(resolve_team("New York Yankees"), Some("NYY"));
        assert_eq!(resolve_team("New York Mets"), Some("NYM"));
        assert_eq!(resolve_team("Chicago White Sox"), Some("CWS"));
        assert_eq!(resolve_team("St. Louis Cardinals"), Some("STL"));
    }

    #[test]
    fn test_resolve_historical_names() {
        assert_eq!(resolve_team("Cleveland Indians"), Some("CLE"));
        assert_eq!(resolve_team("Oakland Athletics"), Some("OAK"));
        assert_eq!(resolve_team("Athletics"), Some("OAK"));
        assert_eq!(resolve_team("Florida Marlins"), Some("MIA"));
    }

    #[test]
    fn test_resolve_case_and_whitespace() {
        assert_eq!(resolve_team("  boston   RED sox "), Some("BOS"));
        assert_eq!(resolve_team("nyy"), Some("NYY"));
    }

    #[test]
    fn test_resolve_alternate_codes() {
        assert_eq!(resolve_team("CHW"), Some("CWS"));
        assert_eq!(resolve_team("WSN"), Some("WSH"));
        assert_eq!(resolve_team("SFG"), Some("SF"));
        assert_eq!(resolve_team("KCR"), Some("KC"));
    }

    #[test]
    fn test_every_code_resolves_to_itself() {
        for code in TEAM_CODES {
            assert_eq!(resolve_team(code), Some(code));
        }
    }

    #[test]
    fn test_unknown_team() {
        assert_eq!(resolve_team("Brooklyn Robins"), None);
        assert!(require_team("").is_err());
    }
}
