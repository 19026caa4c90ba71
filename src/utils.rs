//! Small parsing and formatting helpers shared across commands

/// Split a URL into (scheme with `://`, authority, rest)
///
/// `http://host:8081/path` -> `("http://", "host:8081", "/path")`.
/// A URL without a scheme yields an empty scheme.
pub fn split_url(url: &str) -> (&str, &str, &str) {
  let (scheme, after) = match url.find("://") {
    Some(idx) => url.split_at(idx + 3),
    None => ("", url),
  };
  match after.find('/') {
    Some(idx) => {
      let (authority, rest) = after.split_at(idx);
      (scheme, authority, rest)
    }
    None => (scheme, after, ""),
  }
}

/// Host part of a URL, without userinfo or port
///
/// Bracketed IPv6 literals keep their brackets.
pub fn host_from_url(url: &str) -> &str {
  let (_, authority, _) = split_url(url);
  let host_port = authority.rsplit_once('@').map(|(_, h)| h).unwrap_or(authority);

  if host_port.starts_with('[') {
    return match host_port.find(']') {
      Some(end) => &host_port[..=end],
      None => host_port,
    };
  }

  host_port.split(':').next().unwrap_or(host_port)
}

/// Render a byte count as mebibytes with one decimal (`2.0 MB`)
pub fn format_mebibytes(bytes: u64) -> String {
  format!("{:.1} MB", bytes as f64 / 1024.0 / 1024.0)
}

/// Parse a version out of tool output such as `Python 3.11.4` or `v18.2`
///
/// Takes the first token that starts with a digit, keeps its leading numeric
/// components and pads missing minor/patch with zero.
pub fn parse_lenient_version(text: &str) -> Option<semver::Version> {
  let token = text
    .split_whitespace()
    .map(|t| t.trim_start_matches('v'))
    .find(|t| t.starts_with(|c: char| c.is_ascii_digit()))?;

  let mut parts = token
    .split('.')
    .map(|p| p.chars().take_while(|c| c.is_ascii_digit()).collect::<String>())
    .take_while(|p| !p.is_empty())
    .map(|p| p.parse::<u64>());

  let major = parts.next()?.ok()?;
  let minor = parts.next().transpose().ok()?.unwrap_or(0);
  let patch = parts.next().transpose().ok()?.unwrap_or(0);
  Some(semver::Version::new(major, minor, patch))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_split_url() {
    assert_eq!(split_url("http://10.0.0.1:8081"), ("http://", "10.0.0.1:8081", ""));
    assert_eq!(split_url("https://pypi.example.com/simple/"), ("https://", "pypi.example.com", "/simple/"));
    assert_eq!(split_url("host:1/x"), ("", "host:1", "/x"));
  }

  #[test]
  fn test_host_from_url() {
    assert_eq!(host_from_url("http://192.2.123.34:8081"), "192.2.123.34");
    assert_eq!(host_from_url("http://admin:pw@192.2.123.34:8081/simple/"), "192.2.123.34");
    assert_eq!(host_from_url("https://pypi.internal"), "pypi.internal");
    assert_eq!(host_from_url("http://[::1]:8081/"), "[::1]");
  }

  #[test]
  fn test_format_mebibytes() {
    assert_eq!(format_mebibytes(2_097_152), "2.0 MB");
    assert_eq!(format_mebibytes(0), "0.0 MB");
    assert_eq!(format_mebibytes(1_572_864), "1.5 MB");
  }

  #[test]
  fn test_parse_lenient_version() {
    assert_eq!(parse_lenient_version("Python 3.11.4"), Some(semver::Version::new(3, 11, 4)));
    assert_eq!(parse_lenient_version("v18.2"), Some(semver::Version::new(18, 2, 0)));
    assert_eq!(parse_lenient_version("3.7"), Some(semver::Version::new(3, 7, 0)));
    assert_eq!(parse_lenient_version("Python 3.13.0rc1"), Some(semver::Version::new(3, 13, 0)));
    assert_eq!(parse_lenient_version("no digits here"), None);
    assert_eq!(parse_lenient_version(""), None);
  }
}
