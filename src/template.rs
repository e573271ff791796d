use crate::error::{InstallError, Result};

/// Values a template is rendered against: the display version plus the
/// tool-specific platform and architecture aliases.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub version: String,
    pub platform: String,
    pub arch: String,
}

impl RenderContext {
    fn lookup(&self, key: &str) -> Option<&str> {
        match key {
            "version" => Some(&self.version),
            "platform" => Some(&self.platform),
            "arch" => Some(&self.arch),
            _ => None,
        }
    }
}

/// Render an asset or binary path template.
///
/// The language is deliberately tiny: `{version}`, `{platform}` and `{arch}`
/// substitute context values, and `{key=value?then:else}` picks one of two
/// literal branches by comparing a context value (some upstreams ship `.zip`
/// on one platform and `.tar.gz` on the other). Anything else is a
/// configuration error and fails before any network or filesystem activity.
pub fn render(template: &str, ctx: &RenderContext) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    loop {
        let open = rest.find('{');
        let close = rest.find('}');
        match (open, close) {
            (None, None) => {
                out.push_str(rest);
                return Ok(out);
            }
            (None, Some(_)) => {
                return Err(malformed(template, "`}` without a matching `{`"));
            }
            (Some(_), None) => {
                return Err(malformed(template, "unclosed `{`"));
            }
            (Some(open), Some(close)) => {
                if close < open {
                    return Err(malformed(template, "`}` without a matching `{`"));
                }
                out.push_str(&rest[..open]);
                expand(&mut out, &rest[open + 1..close], ctx, template)?;
                rest = &rest[close + 1..];
            }
        }
    }
}

fn expand(out: &mut String, body: &str, ctx: &RenderContext, template: &str) -> Result<()> {
    if body.is_empty() {
        return Err(malformed(template, "empty placeholder"));
    }

    if let Some((condition, arms)) = body.split_once('?') {
        let (key, expected) = condition
            .split_once('=')
            .ok_or_else(|| malformed(template, "conditional is missing `=`"))?;
        let actual = ctx.lookup(key).ok_or_else(|| unknown_key(template, key))?;
        let (when_equal, otherwise) = arms.split_once(':').unwrap_or((arms, ""));
        out.push_str(if actual == expected { when_equal } else { otherwise });
        return Ok(());
    }

    match ctx.lookup(body) {
        Some(value) => {
            out.push_str(value);
            Ok(())
        }
        None => Err(unknown_key(template, body)),
    }
}

fn malformed(template: &str, reason: &str) -> InstallError {
    InstallError::Template(format!("{} in {:?}", reason, template))
}

fn unknown_key(template: &str, key: &str) -> InstallError {
    InstallError::Template(format!("unknown placeholder `{}` in {:?}", key, template))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RenderContext {
        RenderContext {
            version: "1.2.3".to_string(),
            platform: "macOS".to_string(),
            arch: "arm64".to_string(),
        }
    }

    #[test]
    fn literal_text_passes_through() {
        assert_eq!(render("plain-name.tar.gz", &ctx()).unwrap(), "plain-name.tar.gz");
    }

    #[test]
    fn substitutes_all_keys() {
        assert_eq!(
            render("tool_{version}_{platform}_{arch}.tar.gz", &ctx()).unwrap(),
            "tool_1.2.3_macOS_arm64.tar.gz"
        );
    }

    #[test]
    fn conditional_takes_then_branch() {
        assert_eq!(
            render("gh.{platform=macOS?zip:tar.gz}", &ctx()).unwrap(),
            "gh.zip"
        );
    }

    #[test]
    fn conditional_takes_else_branch() {
        let mut linux = ctx();
        linux.platform = "linux".to_string();
        assert_eq!(
            render("gh.{platform=macOS?zip:tar.gz}", &linux).unwrap(),
            "gh.tar.gz"
        );
    }

    #[test]
    fn conditional_without_else_renders_nothing() {
        let mut linux = ctx();
        linux.platform = "linux".to_string();
        assert_eq!(render("name{platform=macOS?-mac}", &linux).unwrap(), "name");
    }

    #[test]
    fn unknown_placeholder_is_an_error() {
        let err = render("tool-{flavor}.zip", &ctx()).unwrap_err();
        assert!(matches!(err, InstallError::Template(_)), "got {:?}", err);
        assert!(err.to_string().contains("flavor"));
    }

    #[test]
    fn unknown_conditional_key_is_an_error() {
        let err = render("{flavor=x?a:b}", &ctx()).unwrap_err();
        assert!(err.to_string().contains("flavor"));
    }

    #[test]
    fn unclosed_brace_is_an_error() {
        let err = render("tool-{version.zip", &ctx()).unwrap_err();
        assert!(err.to_string().contains("unclosed"));
    }

    #[test]
    fn stray_close_is_an_error() {
        let err = render("tool-version}.zip", &ctx()).unwrap_err();
        assert!(matches!(err, InstallError::Template(_)));
    }

    #[test]
    fn empty_placeholder_is_an_error() {
        let err = render("tool-{}.zip", &ctx()).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn conditional_missing_eq_is_an_error() {
        let err = render("{platform?zip:tar.gz}", &ctx()).unwrap_err();
        assert!(err.to_string().contains("missing `=`"));
    }
}
