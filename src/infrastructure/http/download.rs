//! 下载链接生成
//!
//! 把音频内容以 base64 data URI 内嵌进 `<a download>` 标签，
//! 页面无需再次请求即可保存文件。

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// 转义 HTML 属性/文本中的特殊字符
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// 生成下载链接 HTML
pub fn download_link_html(data: &[u8], file_name: &str, label: &str) -> String {
    format!(
        r#"<a href="data:application/octet-stream;base64,{}" download="{}">Download {}</a>"#,
        STANDARD.encode(data),
        escape_html(file_name),
        escape_html(label)
    )
}
