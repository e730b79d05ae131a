//! Change annotations and the annotator seam.

use cfgchain_diff::{diff_lines, to_unified_changes, DiffStats, NO_CHANGES};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::process::{ChildStdin, Command, Stdio};
use std::thread;
use thiserror::Error;

/// Human-readable notes attached to a block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(default)]
    pub diff: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub analysis: String,
    #[serde(default)]
    pub security_risks: String,
}

impl Annotation {
    /// Reject annotations with an empty field.
    pub fn validate(self) -> Result<Self, AnnotationError> {
        let fields = [
            ("diff", &self.diff),
            ("summary", &self.summary),
            ("analysis", &self.analysis),
            ("security_risks", &self.security_risks),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(AnnotationError::MissingField(*name));
        }
        Ok(self)
    }
}

#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("annotation is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("annotation provider failed: {0}")]
    Provider(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid annotation response: {0}")]
    Response(#[from] serde_json::Error),
}

/// Produces annotations for a configuration change.
pub trait Annotator {
    fn annotate(&self, previous: &str, next: &str) -> Result<Annotation, AnnotationError>;
}

/// Annotates with the LCS diff of the two configurations.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinDiffAnnotator;

impl Annotator for BuiltinDiffAnnotator {
    fn annotate(&self, previous: &str, next: &str) -> Result<Annotation, AnnotationError> {
        let entries = diff_lines(previous, next);
        let stats = DiffStats::of(&entries);

        if stats.is_unchanged() {
            return Ok(Annotation {
                diff: NO_CHANGES.to_string(),
                summary: NO_CHANGES.to_string(),
                analysis: format!(
                    "The configuration is identical to the previous version ({} lines).",
                    stats.common
                ),
                security_risks: "No change, no new risk introduced.".to_string(),
            });
        }

        Ok(Annotation {
            diff: to_unified_changes(&entries),
            summary: format!(
                "{} line(s) added, {} line(s) removed.",
                stats.added, stats.removed
            ),
            analysis: format!(
                "Line-level comparison with the previous version: {} unchanged, {} added, {} removed.",
                stats.common, stats.added, stats.removed
            ),
            security_risks: "Not assessed: the builtin diff annotator does not evaluate security impact."
                .to_string(),
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnnotationRequest<'a> {
    previous_config: &'a str,
    new_config: &'a str,
}

/// Runs an external program for each change.
///
/// The program receives `{"previousConfig": .., "newConfig": ..}` on stdin and
/// must print a JSON object with `diff`, `summary`, `analysis` and
/// `security_risks` on stdout.
#[derive(Debug, Clone)]
pub struct ExternalCommandAnnotator {
    program: String,
    args: Vec<String>,
}

impl ExternalCommandAnnotator {
    pub fn new(command: &[String]) -> Result<Self, AnnotationError> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| AnnotationError::Provider("external command is empty".to_string()))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl Annotator for ExternalCommandAnnotator {
    fn annotate(&self, previous: &str, next: &str) -> Result<Annotation, AnnotationError> {
        let request = serde_json::to_vec(&AnnotationRequest {
            previous_config: previous,
            new_config: next,
        })?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        let stdin = child.stdin.take();

        // The request is fed from a second thread while stdout and stderr are
        // drained, so neither side can block on a full pipe.
        let (written, output) = thread::scope(|scope| {
            let writer = scope.spawn(|| feed_request(stdin, &request));
            let output = child.wait_with_output();
            (writer.join(), output)
        });
        let output = output?;
        written.map_err(|_| AnnotationError::Provider("stdin writer panicked".to_string()))??;

        if !output.status.success() {
            return Err(AnnotationError::Provider(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let annotation: Annotation = serde_json::from_slice(&output.stdout)?;
        annotation.validate()
    }
}

/// Write the request and close stdin. A provider may exit without reading its
/// input; the pipe closing early is not an error.
fn feed_request(stdin: Option<ChildStdin>, request: &[u8]) -> io::Result<()> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };
    match stdin.write_all(request) {
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_counts_changes() {
        let annotation = BuiltinDiffAnnotator
            .annotate("hostname R1\n!\nend", "hostname R2\n!\nlogging host 10.0.0.5\nend")
            .unwrap();
        assert_eq!(
            annotation.diff,
            "- hostname R1\n+ hostname R2\n+ logging host 10.0.0.5"
        );
        assert_eq!(annotation.summary, "2 line(s) added, 1 line(s) removed.");
        assert!(annotation.clone().validate().is_ok());
    }

    #[test]
    fn test_builtin_unchanged() {
        let annotation = BuiltinDiffAnnotator.annotate("a\nb", "a\nb").unwrap();
        assert_eq!(annotation.diff, NO_CHANGES);
    }

    #[test]
    fn test_validate_names_first_missing_field() {
        let annotation = Annotation {
            diff: "+ x".to_string(),
            summary: "s".to_string(),
            analysis: " ".to_string(),
            security_risks: String::new(),
        };
        assert!(matches!(
            annotation.validate(),
            Err(AnnotationError::MissingField("analysis"))
        ));
    }

    #[test]
    fn test_response_with_absent_fields_fails_validation() {
        let annotation: Annotation = serde_json::from_str(r#"{"diff": "+ x"}"#).unwrap();
        assert!(matches!(
            annotation.validate(),
            Err(AnnotationError::MissingField("summary"))
        ));
    }

    #[test]
    fn test_external_empty_command() {
        assert!(matches!(
            ExternalCommandAnnotator::new(&[]),
            Err(AnnotationError::Provider(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_external_command_protocol() {
        let script = r#"cat > /dev/null; echo '{"diff":"+ x","summary":"s","analysis":"a","security_risks":"none"}'"#;
        let annotator =
            ExternalCommandAnnotator::new(&["sh".to_string(), "-c".to_string(), script.to_string()])
                .unwrap();
        let annotation = annotator.annotate("a", "a\nx").unwrap();
        assert_eq!(annotation.summary, "s");
        assert_eq!(annotation.security_risks, "none");
    }

    #[cfg(unix)]
    #[test]
    fn test_external_command_failure() {
        let annotator = ExternalCommandAnnotator::new(&[
            "sh".to_string(),
            "-c".to_string(),
            "cat > /dev/null; echo boom >&2; exit 3".to_string(),
        ])
        .unwrap();
        match annotator.annotate("a", "b") {
            Err(AnnotationError::Provider(message)) => assert!(message.contains("boom")),
            other => panic!("expected provider failure, got {other:?}"),
        }
    }

    fn large_config() -> String {
        "interface GigabitEthernet0/1\n description access port\n".repeat(20_000)
    }

    #[cfg(unix)]
    #[test]
    fn test_provider_ignoring_stdin_still_answers() {
        let annotator = ExternalCommandAnnotator::new(&[
            "sh".to_string(),
            "-c".to_string(),
            r#"echo '{"diff":"+ x","summary":"s","analysis":"a","security_risks":"none"}'"#
                .to_string(),
        ])
        .unwrap();
        let config = large_config();
        let annotation = annotator.annotate(&config, &config).unwrap();
        assert_eq!(annotation.summary, "s");
    }

    #[cfg(unix)]
    #[test]
    fn test_provider_writing_before_reading_does_not_block() {
        // Padding larger than a pipe buffer precedes the JSON object.
        let script = r#"head -c 300000 /dev/zero | tr '\000' ' '; cat > /dev/null; echo '{"diff":"+ x","summary":"s","analysis":"a","security_risks":"none"}'"#;
        let annotator =
            ExternalCommandAnnotator::new(&["sh".to_string(), "-c".to_string(), script.to_string()])
                .unwrap();
        let config = large_config();
        let annotation = annotator.annotate(&config, &config).unwrap();
        assert_eq!(annotation.analysis, "a");
    }

    #[test]
    fn test_missing_program_is_io_error() {
        let annotator =
            ExternalCommandAnnotator::new(&["/nonexistent/annotator".to_string()]).unwrap();
        assert!(matches!(
            annotator.annotate("a", "b"),
            Err(AnnotationError::Io(_))
        ));
    }
}
