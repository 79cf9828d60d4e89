//! Line-oriented directives for driving a shield from a script or terminal.
//!
//! ```text
//! call enableScreenSecurity
//! {"method": "checkScreenRecording"}
//! background
//! capture on
//! wait 250
//! foreground
//! status
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use crate::channel::MethodCall;
use crate::lifecycle::LifecycleTransition;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// Send a control-channel call.
    Call(MethodCall),
    /// Deliver an OS lifecycle notification.
    Lifecycle(LifecycleTransition),
    /// Report a new capture state from the platform.
    Capture(bool),
    /// Let time pass so animations progress.
    Wait(Duration),
    /// Print a status snapshot.
    Status,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DirectiveError {
    #[error("unknown directive: {0}")]
    Unknown(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
    #[error("invalid argument for '{directive}': {value}")]
    InvalidArgument {
        directive: &'static str,
        value: String,
    },
    #[error("invalid method call JSON: {0}")]
    Json(String),
}

impl Directive {
    /// Parse one line. Returns `Ok(None)` for blank and comment lines.
    pub fn parse(line: &str) -> Result<Option<Self>, DirectiveError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        if line.starts_with('{') {
            let call: MethodCall =
                serde_json::from_str(line).map_err(|e| DirectiveError::Json(e.to_string()))?;
            return Ok(Some(Directive::Call(call)));
        }

        let mut parts = line.split_whitespace();
        let keyword = parts.next().unwrap_or_default().to_lowercase();
        let argument = parts.next();

        let directive = match keyword.as_str() {
            "call" => {
                let method = argument.ok_or(DirectiveError::MissingArgument("call"))?;
                Directive::Call(MethodCall::new(method))
            }
            "background" | "willresignactive" => {
                Directive::Lifecycle(LifecycleTransition::WillResignActive)
            }
            "foreground" | "didbecomeactive" => {
                Directive::Lifecycle(LifecycleTransition::DidBecomeActive)
            }
            "capture" => {
                let value = argument.ok_or(DirectiveError::MissingArgument("capture"))?;
                Directive::Capture(parse_switch(value)?)
            }
            "wait" => {
                let value = argument.ok_or(DirectiveError::MissingArgument("wait"))?;
                let millis = value
                    .parse::<u64>()
                    .map_err(|_| DirectiveError::InvalidArgument {
                        directive: "wait",
                        value: value.to_string(),
                    })?;
                Directive::Wait(Duration::from_millis(millis))
            }
            "status" => Directive::Status,
            _ => return Err(DirectiveError::Unknown(line.to_string())),
        };
        Ok(Some(directive))
    }
}

fn parse_switch(value: &str) -> Result<bool, DirectiveError> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "1" | "start" => Ok(true),
        "off" | "false" | "0" | "stop" => Ok(false),
        _ => Err(DirectiveError::InvalidArgument {
            directive: "capture",
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_call_forms() {
        assert_eq!(
            Directive::parse("call enableScreenSecurity").unwrap(),
            Some(Directive::Call(MethodCall::new("enableScreenSecurity")))
        );
        assert_eq!(
            Directive::parse(r#"{"method": "checkScreenRecording"}"#).unwrap(),
            Some(Directive::Call(MethodCall::new("checkScreenRecording")))
        );
        // Method names keep their case.
        assert_eq!(
            Directive::parse("CALL notAMethod").unwrap(),
            Some(Directive::Call(MethodCall::new("notAMethod")))
        );
    }

    #[test]
    fn test_parse_lifecycle_and_capture() {
        assert_eq!(
            Directive::parse("  background ").unwrap(),
            Some(Directive::Lifecycle(LifecycleTransition::WillResignActive))
        );
        assert_eq!(
            Directive::parse("didBecomeActive").unwrap(),
            Some(Directive::Lifecycle(LifecycleTransition::DidBecomeActive))
        );
        assert_eq!(
            Directive::parse("capture on").unwrap(),
            Some(Directive::Capture(true))
        );
        assert_eq!(
            Directive::parse("capture off").unwrap(),
            Some(Directive::Capture(false))
        );
    }

    #[test]
    fn test_parse_wait_and_status() {
        assert_eq!(
            Directive::parse("wait 300").unwrap(),
            Some(Directive::Wait(Duration::from_millis(300)))
        );
        assert_eq!(Directive::parse("status").unwrap(), Some(Directive::Status));
    }

    #[test]
    fn test_blank_and_comments_skipped() {
        assert_eq!(Directive::parse("").unwrap(), None);
        assert_eq!(Directive::parse("   ").unwrap(), None);
        assert_eq!(Directive::parse("# enable first").unwrap(), None);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            Directive::parse("call"),
            Err(DirectiveError::MissingArgument("call"))
        );
        assert!(matches!(
            Directive::parse("capture maybe"),
            Err(DirectiveError::InvalidArgument { .. })
        ));
        assert!(matches!(
            Directive::parse("wait soon"),
            Err(DirectiveError::InvalidArgument { .. })
        ));
        assert!(matches!(
            Directive::parse("{not json"),
            Err(DirectiveError::Json(_))
        ));
        assert!(matches!(
            Directive::parse("screenshot"),
            Err(DirectiveError::Unknown(_))
        ));
    }
}
