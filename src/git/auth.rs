/// Embed an access token into the credential position of a repository
/// URL, producing a URL suitable for a non-interactive clone.
///
/// With no token (or an empty one) the plain URL is returned unchanged,
/// implying a public repository or SSH-agent authentication. No URL
/// validation is performed here; malformed URLs surface as clone
/// failures.
pub fn authenticated_url(repo_url: &str, token: Option<&str>) -> String {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return repo_url.to_string();
    };
    match repo_url.split_once("://") {
        Some((scheme, rest)) => format!("{scheme}://{token}@{rest}"),
        // scp-style or otherwise schemeless; leave it to the backend
        None => repo_url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_lands_in_userinfo() {
        assert_eq!(
            authenticated_url("https://github.com/acme/fns.git", Some("tok123")),
            "https://tok123@github.com/acme/fns.git"
        );
    }

    #[test]
    fn no_token_returns_url_unchanged() {
        let url = "https://github.com/acme/fns.git";
        assert_eq!(authenticated_url(url, None), url);
    }

    #[test]
    fn empty_token_is_treated_as_absent() {
        let url = "https://github.com/acme/fns.git";
        assert_eq!(authenticated_url(url, Some("")), url);
    }

    #[test]
    fn schemeless_url_passes_through() {
        let url = "git@github.com:acme/fns.git";
        assert_eq!(authenticated_url(url, Some("tok")), url);
    }
}
