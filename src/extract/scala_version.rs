//! Scala version helpers.

/// Major component of a Maven-style version (`"3.3.1"` -> `3`).
#[must_use]
pub fn major_version(version: &str) -> Option<u64> {
    version.trim().split(['.', '-', '+']).next()?.parse().ok()
}

/// Reduce a full Scala version to the binary version used in artifact suffixes.
///
/// - `2.13.8` -> `2.13`
/// - `3.3.1` -> `3`
/// - versions below `2.10.0`, and anything that is not `x.y.z`, are returned
///   unchanged minus surrounding quotes
#[must_use]
pub fn normalize_scala_version(version: &str) -> String {
    let version = version.trim().trim_matches('"');

    let parts: Vec<&str> = version.split('.').collect();
    let numeric = parts.len() == 3
        && parts.iter().all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()));
    if !numeric {
        return version.to_string();
    }

    let (Ok(major), Ok(minor)) = (parts[0].parse::<u64>(), parts[1].parse::<u64>()) else {
        return version.to_string();
    };

    match major {
        0 | 1 => version.to_string(),
        2 if minor < 10 => version.to_string(),
        2 => format!("{major}.{minor}"),
        _ => major.to_string(),
    }
}
