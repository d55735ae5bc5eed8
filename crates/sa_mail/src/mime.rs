use mailparse::{parse_mail, ParsedMail};

/// Extract the first text/html part from a raw RFC 822 message.
///
/// Scholar alerts usually arrive as multipart/alternative; nested multiparts
/// are walked depth-first so multipart/mixed wrappers also work.
pub fn extract_html_part(raw: &[u8]) -> Option<String> {
    let mail = parse_mail(raw).ok()?;
    find_html(&mail)
}

fn find_html(part: &ParsedMail) -> Option<String> {
    if part.ctype.mimetype.eq_ignore_ascii_case("text/html") {
        return part.get_body().ok();
    }
    for sub in &part.subparts {
        if let Some(html) = find_html(sub) {
            return Some(html);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_html_from_singlepart() {
        let raw = b"Content-Type: text/html; charset=utf-8\r\n\r\n<html><b>hi</b></html>";
        let html = extract_html_part(raw).unwrap();
        assert!(html.contains("<b>hi</b>"));
    }

    #[test]
    fn test_prefers_html_part_in_multipart_alternative() {
        let raw = b"Content-Type: multipart/alternative; boundary=\"sep\"\r\n\r\n\
--sep\r\nContent-Type: text/plain\r\n\r\nplain body\r\n\
--sep\r\nContent-Type: text/html\r\n\r\n<p>html body</p>\r\n\
--sep--\r\n";
        let html = extract_html_part(raw).unwrap();
        assert!(html.contains("<p>html body</p>"));
        assert!(!html.contains("plain body"));
    }

    #[test]
    fn test_plain_text_only_message_yields_none() {
        let raw = b"Content-Type: text/plain\r\n\r\njust text";
        assert!(extract_html_part(raw).is_none());
    }
}
