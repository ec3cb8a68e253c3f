//! Replay preparation: reduce free-form candidate output to tool calls.

/// Opening fence of a tool-call block.
const TOOL_CALL_OPEN: &str = "```tool_call";

/// Closing fence of a tool-call block.
const TOOL_CALL_CLOSE: &str = "```";

/// Keep only fenced tool-call blocks from a candidate's raw content,
/// verbatim including the fences, joined by a single newline. Narrative,
/// think-tags, and everything else between blocks is discarded.
///
/// Both fences must sit at the start of a line; a mid-line mention of the
/// fence is prose, not a block, and backticks inside a block body do not
/// terminate it. Zero matches produce an empty string; an unterminated
/// opening fence is ignored.
pub fn extract_tool_calls_only(content: &str) -> String {
    let bytes = content.as_bytes();
    let mut blocks: Vec<&str> = Vec::new();
    let mut offset = 0;
    while let Some(found) = content[offset..].find(TOOL_CALL_OPEN) {
        let start = offset + found;
        if start > 0 && bytes[start - 1] != b'\n' {
            offset = start + TOOL_CALL_OPEN.len();
            continue;
        }
        let Some(block_end) = find_closing_fence(content, start + TOOL_CALL_OPEN.len()) else {
            break;
        };
        blocks.push(&content[start..block_end]);
        offset = block_end;
    }
    blocks.join("\n")
}

/// End offset (past the fence) of the first closing fence at or after
/// `from` that occupies a whole line.
fn find_closing_fence(content: &str, from: usize) -> Option<usize> {
    let bytes = content.as_bytes();
    let mut offset = from;
    while let Some(found) = content[offset..].find(TOOL_CALL_CLOSE) {
        let start = offset + found;
        let end = start + TOOL_CALL_CLOSE.len();
        let opens_line = start == 0 || bytes[start - 1] == b'\n';
        let ends_line = end == content.len() || bytes[end] == b'\n';
        if opens_line && ends_line {
            return Some(end);
        }
        offset = start + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn no_tool_calls_yields_empty_string() {
        assert_eq!(extract_tool_calls_only("no tool calls here"), "");
    }

    #[test]
    fn two_blocks_joined_by_single_newline() {
        let first = "```tool_call\n{\"name\":\"read_file\"}\n```";
        let second = "```tool_call\n{\"name\":\"edit_file\"}\n```";
        let content = format!("I think we should...\n{first}\nnow the edit:\n{second}\ndone!");
        assert_eq!(
            extract_tool_calls_only(&content),
            format!("{first}\n{second}")
        );
    }

    #[test]
    fn single_block_returned_verbatim() {
        let block = "```tool_call\n{\"name\":\"run_tests\",\"args\":{}}\n```";
        let content = format!("<think>maybe</think>\n{block}\ntrailing prose");
        assert_eq!(extract_tool_calls_only(&content), block);
    }

    #[test]
    fn mid_line_fence_mention_is_prose() {
        let content = "I recommend wrapping calls in ```tool_call fences like ``` this.";
        assert_eq!(extract_tool_calls_only(content), "");
    }

    #[test]
    fn backticks_inside_block_body_do_not_close_it() {
        let block = "```tool_call\n{\"cmd\":\"echo ``` done\"}\nsee ```rust above\n```";
        let content = format!("{block}\nafterword");
        assert_eq!(extract_tool_calls_only(&content), block);
    }

    #[test]
    fn unterminated_block_is_dropped() {
        let content = "```tool_call\n{\"name\":\"read_file\"}";
        assert_eq!(extract_tool_calls_only(content), "");
    }

    #[test]
    fn terminated_block_before_unterminated_one_survives() {
        let block = "```tool_call\n{}\n```";
        let content = format!("{block}\n```tool_call\nno close");
        assert_eq!(extract_tool_calls_only(&content), block);
    }
}
