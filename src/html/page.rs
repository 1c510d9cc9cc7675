//! Page assembly: the fixed stylesheet and the HTML5 shell around a
//! rendered body.

use crate::model::Metadata;

use super::options::PageOptions;

/// Known shading fills mapped to palette classes. Anything else falls
/// back to an inline background style at the call site.
pub fn fill_class(hex: &str) -> Option<&'static str> {
    Some(match hex {
        "1E4D8C" | "1B2A4A" => "fill-navy",
        "2E86C1" => "fill-blue",
        "1A7A4A" => "fill-green",
        "B7860B" => "fill-gold",
        "D6E4F0" | "D6E4F7" => "fill-sky",
        "F2F7FF" | "EEF4FF" => "fill-sky-pale",
        "F4F6F8" | "F9F9F9" => "fill-lightgray",
        "C8E6C9" => "fill-green-light",
        "FFF9C4" => "fill-yellow",
        "FFCDD2" => "fill-red-light",
        "EDE7F6" => "fill-purple-light",
        "FFFFFF" => "fill-white",
        _ => return None,
    })
}

/// Dark fills take white text.
pub fn fill_is_dark(hex: &str) -> bool {
    matches!(hex, "1E4D8C" | "1B2A4A" | "2E86C1" | "1A7A4A" | "B7860B")
}

/// The embedded stylesheet. Mobile-first, no external assets.
pub const STYLESHEET: &str = r#"
:root {
  --navy:   #1E3A5F;
  --blue:   #2E6DA4;
  --green:  #1A7A4A;
  --gold:   #C8960C;
  --sky:    #D6E4F0;
  --ink:    #1A1A2E;
  --mid:    #6B7A8D;
  --mist:   #F5F7FA;
  --border: #DDE3EC;
  --white:  #FFFFFF;
  --serif:  'DM Serif Display', Georgia, serif;
  --sans:   'DM Sans', system-ui, sans-serif;
}

*, *::before, *::after { box-sizing: border-box; margin: 0; padding: 0; }

body {
  font-family: var(--sans);
  background: var(--mist);
  color: var(--ink);
  font-size: 15px;
  line-height: 1.75;
}

.doc-wrapper {
  max-width: 780px;
  margin: 0 auto;
  padding: 32px 20px 80px;
}
.doc-card {
  background: var(--white);
  border-radius: 10px;
  border: 1px solid var(--border);
  overflow: hidden;
  box-shadow: 0 2px 12px rgba(0,0,0,0.06);
}
.doc-title-bar {
  background: var(--navy);
  padding: 28px 32px;
  border-bottom: 4px solid var(--gold);
}
.doc-title-bar h1 {
  font-family: var(--serif);
  font-size: clamp(20px, 4vw, 28px);
  color: #fff;
  line-height: 1.2;
  border: none;
  margin: 0;
  padding: 0;
}
.doc-title-bar p { font-size: 13px; color: rgba(255,255,255,0.5); margin-top: 6px; }
.doc-body { padding: 36px 32px 56px; }
@media (max-width: 600px) {
  .doc-body { padding: 24px 18px 40px; }
}

h1 {
  font-family: var(--serif);
  font-size: clamp(20px, 4vw, 26px);
  color: var(--navy);
  margin: 40px 0 10px;
  padding-bottom: 10px;
  border-bottom: 2px solid var(--sky);
  line-height: 1.25;
}
h1:first-child { margin-top: 0; }
h2 {
  font-family: var(--serif);
  font-size: clamp(17px, 3vw, 21px);
  color: var(--blue);
  margin: 30px 0 8px;
  line-height: 1.3;
}
h3 {
  font-size: 12px;
  font-weight: 700;
  color: var(--navy);
  text-transform: uppercase;
  letter-spacing: 0.07em;
  margin: 24px 0 6px;
}
h4, h5, h6 {
  font-size: 13px;
  font-weight: 700;
  color: var(--navy);
  margin: 20px 0 6px;
}
p { margin: 0 0 14px; }
p:last-child { margin-bottom: 0; }
strong { font-weight: 600; color: var(--navy); }
em { font-style: italic; }
a { color: var(--blue); }
ul, ol { padding-left: 22px; margin: 0 0 16px; }
li { margin-bottom: 6px; }
li > ul, li > ol { margin-top: 6px; margin-bottom: 0; }

blockquote {
  border-left: 3px solid var(--gold);
  padding: 6px 0 6px 16px;
  color: var(--mid);
  font-style: italic;
  margin: 0 0 16px;
}

.align-center { text-align: center; }
.align-right { text-align: right; }
.align-justify { text-align: justify; }

.shaded-para {
  padding: 10px 16px;
  margin: 28px 0 12px;
  border-radius: 4px;
  font-weight: 600;
}

.toc {
  background: var(--mist);
  border: 1px solid var(--border);
  border-radius: 6px;
  padding: 16px 20px;
  margin: 0 0 28px;
  font-size: 14px;
}
.toc-title {
  font-size: 11px;
  font-weight: 700;
  text-transform: uppercase;
  letter-spacing: 0.1em;
  color: var(--mid);
  margin-bottom: 8px;
}
.toc ol { list-style: none; padding-left: 0; margin: 0; }
.toc li { margin-bottom: 4px; }
.toc .toc-2 { padding-left: 16px; }
.toc .toc-3 { padding-left: 32px; }
.toc a { text-decoration: none; }
.toc a:hover { text-decoration: underline; }

.table-wrap {
  overflow-x: auto;
  -webkit-overflow-scrolling: touch;
  margin: 0 0 24px;
  border: 1px solid var(--border);
  border-radius: 6px;
}
table {
  border-collapse: collapse;
  width: 100%;
  font-size: 14px;
}
th, td {
  border: 1px solid var(--border);
  padding: 9px 12px;
  text-align: left;
  vertical-align: top;
}
th {
  background: var(--navy);
  color: #fff;
  font-weight: 600;
}
td p:last-child, th p:last-child { margin-bottom: 0; }

.fill-navy { background: var(--navy); color: #fff; }
.fill-blue { background: var(--blue); color: #fff; }
.fill-green { background: var(--green); color: #fff; }
.fill-gold { background: var(--gold); color: #fff; }
.fill-sky { background: var(--sky); }
.fill-sky-pale { background: #F2F7FF; }
.fill-lightgray { background: #F4F6F8; }
.fill-green-light { background: #C8E6C9; }
.fill-yellow { background: #FFF9C4; }
.fill-red-light { background: #FFCDD2; }
.fill-purple-light { background: #EDE7F6; }
.fill-white { background: #FFFFFF; }
.fill-navy strong, .fill-blue strong, .fill-green strong, .fill-gold strong { color: #fff; }

img {
  max-width: 100%;
  height: auto;
  border-radius: 4px;
  margin: 0 0 14px;
}
.missing-image {
  display: inline-block;
  background: var(--mist);
  border: 1px dashed var(--border);
  color: var(--mid);
  font-size: 12px;
  padding: 8px 14px;
  border-radius: 4px;
  margin: 0 0 14px;
}

.doc-footer {
  text-align: center;
  font-size: 12px;
  color: var(--mid);
  padding: 24px 0 0;
}
"#;

const FONT_LINKS: &str = r#"<link rel="preconnect" href="https://fonts.googleapis.com">
<link rel="preconnect" href="https://fonts.gstatic.com" crossorigin>
<link href="https://fonts.googleapis.com/css2?family=DM+Serif+Display:ital@0;1&family=DM+Sans:ital,wght@0,300;0,400;0,500;0,600;1,300;1,400&display=swap" rel="stylesheet">
"#;

/// Wrap a rendered body in the full standalone page.
pub fn assemble(body: &str, metadata: &Metadata, options: &PageOptions) -> String {
    let title = options
        .title
        .clone()
        .or_else(|| metadata.title.clone())
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| "Document".to_string());
    let title = escape_html(&title);

    let fonts = if options.remote_fonts { FONT_LINKS } else { "" };
    let subtitle = match metadata.author.as_deref() {
        Some(author) if !author.trim().is_empty() => {
            format!("<p>{}</p>\n", escape_html(author))
        }
        _ => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
{fonts}<style>{css}</style>
</head>
<body>
<div class="doc-wrapper">
  <div class="doc-card">
    <div class="doc-title-bar">
      <h1>{title}</h1>
      {subtitle}</div>
    <div class="doc-body">
{body}
    </div>
  </div>
</div>
</body>
</html>
"#,
        title = title,
        fonts = fonts,
        css = STYLESHEET,
        subtitle = subtitle,
        body = body,
    )
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_includes_viewport_and_styles() {
        let page = assemble("<p>hi</p>", &Metadata::default(), &PageOptions::default());
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains(r#"name="viewport""#));
        assert!(page.contains("<style>"));
        assert!(page.contains("<p>hi</p>"));
    }

    #[test]
    fn test_remote_fonts_toggle() {
        let with = assemble("", &Metadata::default(), &PageOptions::default());
        assert!(with.contains("fonts.googleapis.com"));

        let without = assemble(
            "",
            &Metadata::default(),
            &PageOptions::default().with_remote_fonts(false),
        );
        assert!(!without.contains("fonts.googleapis.com"));
        // System font fallbacks stay declared regardless.
        assert!(without.contains("system-ui"));
    }

    #[test]
    fn test_title_fallback_chain() {
        let meta = Metadata {
            title: Some("From Metadata".to_string()),
            ..Default::default()
        };
        let page = assemble("", &meta, &PageOptions::default());
        assert!(page.contains("<title>From Metadata</title>"));

        let page = assemble("", &meta, &PageOptions::default().with_title("Explicit"));
        assert!(page.contains("<title>Explicit</title>"));

        let page = assemble("", &Metadata::default(), &PageOptions::default());
        assert!(page.contains("<title>Document</title>"));
    }

    #[test]
    fn test_title_is_escaped() {
        let page = assemble(
            "",
            &Metadata::default(),
            &PageOptions::default().with_title("A <B> & C"),
        );
        assert!(page.contains("<title>A &lt;B&gt; &amp; C</title>"));
    }

    #[test]
    fn test_fill_palette() {
        assert_eq!(fill_class("1E4D8C"), Some("fill-navy"));
        assert_eq!(fill_class("ABCDEF"), None);
        assert!(fill_is_dark("1A7A4A"));
        assert!(!fill_is_dark("D6E4F0"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }
}
