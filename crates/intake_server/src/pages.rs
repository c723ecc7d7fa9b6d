//! Server-rendered documents. Results carry placeholder totals; no PDF
//! parsing or tax computation happens here.

use crate::store::Calculator;

pub fn intake_page() -> String {
    concat!(
        "<!DOCTYPE html>\n",
        "<html lang=\"tr\">\n",
        "<head><meta charset=\"utf-8\"><title>Vergi Hesapla</title></head>\n",
        "<body>\n",
        "<div id=\"dropZone\"><input type=\"file\" id=\"fileInput\" accept=\"application/pdf\" multiple></div>\n",
        "<div id=\"fileList\"></div>\n",
        "<button class=\"calculate-button\" disabled>Hesapla</button>\n",
        "</body>\n",
        "</html>\n",
    )
    .to_string()
}

pub fn results_page(calculator: &Calculator) -> String {
    let files: String = calculator
        .pdfs
        .iter()
        .map(|pdf| {
            format!(
                "<li>{} ({} bytes)</li>\n",
                escape_html(&pdf.filename),
                pdf.size_bytes
            )
        })
        .collect();

    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"tr\">\n\
         <head><meta charset=\"utf-8\"><title>Sonuçlar</title></head>\n\
         <body>\n\
         <section class=\"summary\" data-calculator-id=\"{id}\">\n\
         <p class=\"total-profit-loss\">0.00</p>\n\
         <p class=\"tax-amount\">0.00</p>\n\
         <p class=\"transaction-count\">0</p>\n\
         </section>\n\
         <ul class=\"files\">\n{files}</ul>\n\
         </body>\n\
         </html>\n",
        id = escape_html(calculator.id.as_str()),
    )
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
