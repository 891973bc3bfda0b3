//! Dialect conversion between committed and stored function source.
//!
//! Functions are committed to git as standard ES modules
//! (`export default async function main(...)`), while the store keeps
//! them in the runtime's CommonJS-flavored form
//! (`exports.default = async function main(...)`).
//!
//! Both directions are pure text rewrites: deterministic, total (text
//! without an export header passes through unchanged), and free of any
//! filesystem or network access. Every synced function goes through
//! [`to_internal`], so a bug here corrupts all of them uniformly.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static EXPORT_DEFAULT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^export\s+default\s+(async\s+)?function\b").unwrap());

static EXPORT_NAMED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^export\s+(async\s+)?function\s+([A-Za-z_$][\w$]*)").unwrap());

static EXPORTS_DEFAULT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^exports\.default\s*=\s*(async\s+)?function\b").unwrap());

static EXPORTS_NAMED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^exports\.[A-Za-z_$][\w$]*\s*=\s*(async\s+)?function\s+([A-Za-z_$][\w$]*)")
        .unwrap()
});

/// Convert committed (git) source to the internal stored dialect.
///
/// Rewrites, at line starts:
/// - `export default [async] function [name](` → `exports.default = [async] function [name](`
/// - `export [async] function name(` → `exports.name = [async] function name(`
///
/// Line endings are normalized to LF first so that files committed from
/// Windows checkouts compare equal to stored code.
pub fn to_internal(raw: &str) -> String {
    let text = raw.replace("\r\n", "\n");

    let text = EXPORT_DEFAULT_RE.replace_all(&text, |caps: &Captures| {
        format!("exports.default = {}function", async_prefix(caps, 1))
    });

    let text = EXPORT_NAMED_RE.replace_all(&text, |caps: &Captures| {
        format!("exports.{} = {}function {}", &caps[2], async_prefix(caps, 1), &caps[2])
    });

    text.into_owned()
}

/// Convert internal stored source back to the committed (git) dialect.
///
/// Exact inverse of [`to_internal`] on everything that function
/// produces; used by the push direction and by round-trip tests.
pub fn to_committed(code: &str) -> String {
    let text = EXPORTS_DEFAULT_RE.replace_all(code, |caps: &Captures| {
        format!("export default {}function", async_prefix(caps, 1))
    });

    let text = EXPORTS_NAMED_RE.replace_all(&text, |caps: &Captures| {
        format!("export {}function {}", async_prefix(caps, 1), &caps[2])
    });

    text.into_owned()
}

/// `"async "` (whitespace normalized) if the capture group matched.
fn async_prefix(caps: &Captures, group: usize) -> &'static str {
    if caps.get(group).is_some() { "async " } else { "" }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMMITTED: &str = "\
import cloud from \"@funsync/runtime\";

export default async function main(ctx) {
  return cloud.ok(ctx.body);
}

export function helper(x) {
  return x + 1;
}
";

    const INTERNAL: &str = "\
import cloud from \"@funsync/runtime\";

exports.default = async function main(ctx) {
  return cloud.ok(ctx.body);
}

exports.helper = function helper(x) {
  return x + 1;
}
";

    #[test]
    fn fixed_sample_to_internal() {
        assert_eq!(to_internal(COMMITTED), INTERNAL);
    }

    #[test]
    fn fixed_sample_to_committed() {
        assert_eq!(to_committed(INTERNAL), COMMITTED);
    }

    #[test]
    fn round_trip_committed() {
        assert_eq!(to_committed(&to_internal(COMMITTED)), COMMITTED);
    }

    #[test]
    fn round_trip_internal() {
        assert_eq!(to_internal(&to_committed(INTERNAL)), INTERNAL);
    }

    #[test]
    fn anonymous_default_export() {
        assert_eq!(
            to_internal("export default function (ctx) {}\n"),
            "exports.default = function (ctx) {}\n"
        );
    }

    #[test]
    fn crlf_is_normalized() {
        assert_eq!(
            to_internal("export default function main() {\r\n}\r\n"),
            "exports.default = function main() {\n}\n"
        );
    }

    #[test]
    fn text_without_exports_passes_through() {
        let plain = "const x = 1;\nconsole.log(x);\n";
        assert_eq!(to_internal(plain), plain);
        assert_eq!(to_committed(plain), plain);
    }

    #[test]
    fn indented_export_is_left_alone() {
        // Only top-of-line headers are module exports.
        let src = "  export function inner() {}\n";
        assert_eq!(to_internal(src), src);
    }

    #[test]
    fn conversion_is_deterministic() {
        assert_eq!(to_internal(COMMITTED), to_internal(COMMITTED));
    }
}
