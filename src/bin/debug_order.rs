use stext_inspector::{layout_text_file, LayoutMetrics};

fn main() {
    let path = std::env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: debug-order <text_file>");
        std::process::exit(1);
    });
    let page = match layout_text_file(&path, &LayoutMetrics::default()) {
        Ok(page) => page,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    println!("Reading order ({} chars):", page.char_count());
    for span in page.line_spans() {
        let line = page.line(span);
        let b = line.bbox();
        println!(
            "block {:3} line {:3} [{:4}..{:4}] bbox=({:6.1},{:6.1})-({:6.1},{:6.1}) \"{}\"",
            span.block,
            span.line,
            span.start,
            span.end,
            b.x0,
            b.y0,
            b.x1,
            b.y1,
            line.text()
        );
    }
}
