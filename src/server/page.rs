//! Static page template and styling.
//!
//! The style sheet and markup are static configuration injected into the
//! shell; the encoder knows nothing about them. All user-supplied text is
//! HTML-escaped before interpolation.

/// Style sheet for the single page.
const STYLE: &str = r#"
body {
    background-color: #f4f6f9;
    font-family: 'Arial', sans-serif;
    color: #333;
}

.title {
    text-align: center;
    font-size: 36px;
    color: #3f51b5;
    margin-top: 50px;
    font-weight: bold;
}

.description {
    text-align: center;
    font-size: 18px;
    margin-top: 10px;
    color: #555;
}

.input-container {
    display: flex;
    justify-content: center;
    margin-top: 20px;
}

.input-field {
    width: 60%;
    padding: 10px;
    font-size: 16px;
    border: 2px solid #4caf50;
    border-radius: 8px;
    outline: none;
    margin-right: 10px;
}

.input-field:focus {
    border-color: #3f51b5;
}

.button {
    padding: 10px 20px;
    background-color: #4caf50;
    color: white;
    border-radius: 8px;
    border: none;
    cursor: pointer;
    font-size: 16px;
    transition: background-color 0.3s ease;
}

.button:hover {
    background-color: #45a049;
}

.qr-container {
    text-align: center;
    margin-top: 40px;
}

.qr-container .caption {
    margin-top: 10px;
    color: #555;
}

.warning {
    text-align: center;
    margin-top: 30px;
    padding: 10px;
    color: #8a6d3b;
    background-color: #fcf8e3;
    border: 1px solid #faebcc;
    border-radius: 8px;
    width: 60%;
    margin-left: auto;
    margin-right: auto;
}

.download-btn {
    display: inline-block;
    width: 200px;
    margin: 20px auto;
    padding: 10px;
    background-color: #3f51b5;
    color: white;
    font-size: 16px;
    text-align: center;
    text-decoration: none;
    border: none;
    border-radius: 8px;
    cursor: pointer;
    transition: background-color 0.3s ease;
}

.download-btn:hover {
    background-color: #303f9f;
}
"#;

/// Renders the full page. `input` pre-fills the text field; `body` is the
/// result area (preview, warning, or nothing).
fn render(input: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>QR Code Generator</title>
<style>{STYLE}</style>
</head>
<body>
<div class="title">&#128279; QR Code Generator</div>
<div class="description">Easily generate a QR code for any URL. Enter the URL below, and get a downloadable QR code image.</div>
<form class="input-container" method="get" action="/">
<input class="input-field" type="text" name="url" placeholder="https://example.com" value="{input}">
<button class="button" type="submit">Generate QR Code</button>
</form>
{body}
</body>
</html>
"#,
        input = escape_html(input),
        body = body,
    )
}

/// The landing page, before any input has been submitted.
pub fn render_landing() -> String {
    render("", "")
}

/// The page after a successful encode: inline preview plus download link.
pub fn render_result(input: &str, data_url: &str) -> String {
    let body = format!(
        r#"<div class="qr-container">
<img src="{data_url}" alt="QR code">
<div class="caption">Your QR Code</div>
<a class="download-btn" href="/download?url={query}" download="qrcode.png">Download QR Code</a>
</div>"#,
        data_url = data_url,
        query = escape_query(input),
    );
    render(input, &body)
}

/// The page after an empty submission: the warn-and-skip path.
pub fn render_warning(input: &str) -> String {
    let body = r#"<div class="warning">Please enter a valid URL.</div>"#;
    render(input, body)
}

/// The page after an encode failure, with the error message.
pub fn render_error(input: &str, message: &str) -> String {
    let body = format!(
        r#"<div class="warning">Could not generate a QR code: {}</div>"#,
        escape_html(message)
    );
    render(input, &body)
}

/// Escapes text for interpolation into HTML content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encodes text for use inside a query string value.
fn escape_query(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for &b in text.as_bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_page_embeds_preview_and_download_link() {
        let page = render_result("https://example.com", "data:image/png;base64,AAAA");
        assert!(page.contains(r#"<img src="data:image/png;base64,AAAA""#));
        assert!(page.contains("/download?url=https%3A%2F%2Fexample.com"));
        assert!(page.contains(r#"download="qrcode.png""#));
    }

    #[test]
    fn warning_page_has_no_image() {
        let page = render_warning("");
        assert!(page.contains("Please enter a valid URL."));
        assert!(!page.contains("<img"));
    }

    #[test]
    fn user_input_is_escaped() {
        let page = render_result("\"><script>alert(1)</script>", "data:image/png;base64,AAAA");
        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;"));
    }

    #[test]
    fn query_escaping_covers_reserved_characters() {
        assert_eq!(escape_query("a b&c"), "a%20b%26c");
        assert_eq!(escape_query("safe-._~09AZaz"), "safe-._~09AZaz");
    }
}
