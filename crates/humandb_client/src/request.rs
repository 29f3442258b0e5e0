//! Turning a command line into a [`Request`].

use std::io::Write;

use humandb_protocol::{ArgShape, CommandDescriptor, Request};
use tokio::io::AsyncBufRead;

use crate::error::{ClientError, ClientResult};
use crate::form::{parse_positive, Form};

/// Split a command line into the command name and its inline arguments.
///
/// Returns `None` for a blank line.
pub fn split_line(line: &str) -> Option<(&str, Vec<&str>)> {
    let mut words = line.split_whitespace();
    let command = words.next()?;
    Some((command, words.collect()))
}

fn inline_int(raw: &str, what: &str) -> ClientResult<i32> {
    parse_positive(raw).map_err(|reason| ClientError::invalid(format!("{what} {raw:?}: {reason}")))
}

/// Build the request for `descriptor`, asking `form` for any record or key.
///
/// `execute_script` only checks its argument here; the caller opens the
/// script.
///
/// # Errors
///
/// - [`ClientError::CommandArgument`] if the inline argument count is wrong
/// - [`ClientError::InvalidInput`] if an inline key or id is not a positive
///   integer
/// - any error from the form
pub async fn build_request<R, W>(
    descriptor: &CommandDescriptor,
    args: &[&str],
    form: &mut Form<'_, R, W>,
) -> ClientResult<Request>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let expected = descriptor.shape.inline_args();
    if args.len() != expected {
        return Err(ClientError::CommandArgument {
            expected,
            actual: args.len(),
        });
    }

    let request = Request::new(descriptor.name);
    Ok(match descriptor.shape {
        ArgShape::None | ArgShape::ScriptPath => request,
        ArgShape::Key => request.with_argument(inline_int(args[0], "key")?),
        ArgShape::Record => request.with_record(form.collect_record().await?),
        ArgShape::RecordKey => {
            let key = form.collect_key().await?;
            request.with_key(key).with_record(form.collect_record().await?)
        }
        ArgShape::IdKeyRecord => {
            let id = inline_int(args[0], "id")?;
            let key = form.collect_key().await?;
            request
                .with_argument(id)
                .with_key(key)
                .with_record(form.collect_record().await?)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputStack;
    use humandb_protocol::CommandKind;

    const RECORD_LINES: &str = "Rick\n1.5\n-3\ntrue\nTheme\n120\n2.25\nknife\nfalse\n\ntrue\n";

    async fn build(kind: CommandKind, args: &[&str], console: &str) -> ClientResult<Request> {
        let descriptor = kind.descriptor();
        let mut input = InputStack::new(console.as_bytes());
        let mut output = Vec::new();
        let mut form = Form::new(&mut input, &mut output);
        let request = build_request(&descriptor, args, &mut form).await;
        request
    }

    #[test]
    fn split_lines() {
        assert_eq!(split_line("   "), None);
        assert_eq!(split_line("show"), Some(("show", vec![])));
        assert_eq!(
            split_line("  remove_key   12 "),
            Some(("remove_key", vec!["12"]))
        );
    }

    #[tokio::test]
    async fn argument_count_is_checked() {
        let err = build(CommandKind::Show, &["1"], "").await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::CommandArgument {
                expected: 0,
                actual: 1
            }
        ));
        let err = build(CommandKind::RemoveKey, &[], "").await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::CommandArgument {
                expected: 1,
                actual: 0
            }
        ));
    }

    #[tokio::test]
    async fn inline_key_must_be_positive() {
        for raw in ["0", "-5", "ten", "3.5"] {
            let err = build(CommandKind::RemoveKey, &[raw], "").await.unwrap_err();
            assert!(matches!(err, ClientError::InvalidInput(_)), "{raw}");
        }
        let request = build(CommandKind::RemoveGreaterKey, &["9"], "").await.unwrap();
        assert_eq!(request.command, "remove_greater_key");
        assert_eq!(request.argument, Some(9));
    }

    #[tokio::test]
    async fn insert_asks_key_then_record() {
        let console = format!("7\n{RECORD_LINES}");
        let request = build(CommandKind::Insert, &[], &console).await.unwrap();
        assert_eq!(request.command, "insert");
        assert_eq!(request.key, Some(7));
        assert_eq!(request.argument, None);
        let record = request.record.unwrap();
        assert_eq!(record.name, "Rick");
        assert_eq!(record.car.name, "");
    }

    #[tokio::test]
    async fn update_takes_inline_id() {
        let console = format!("3\n{RECORD_LINES}");
        let request = build(CommandKind::Update, &["12"], &console).await.unwrap();
        assert_eq!(request.argument, Some(12));
        assert_eq!(request.key, Some(3));
        assert!(request.record.is_some());
    }

    #[tokio::test]
    async fn remove_lower_sends_record_only() {
        let request = build(CommandKind::RemoveLower, &[], RECORD_LINES)
            .await
            .unwrap();
        assert_eq!(request.key, None);
        assert!(request.record.is_some());
    }

    #[tokio::test]
    async fn script_path_is_not_sent() {
        let request = build(CommandKind::ExecuteScript, &["run.txt"], "")
            .await
            .unwrap();
        assert_eq!(request, Request::new("execute_script"));
    }
}
