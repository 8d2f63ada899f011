use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

const DEFAULT_COLOR: Color = Color::Gray;

fn code_color(code: char) -> Option<Color> {
    let color = match code {
        '0' => Color::Black,
        '1' => Color::Blue,
        '2' => Color::Green,
        '3' => Color::Cyan,
        '4' => Color::Red,
        '5' => Color::Magenta,
        '6' => Color::Yellow,
        '7' => Color::Gray,
        '8' => Color::DarkGray,
        '9' => Color::LightBlue,
        'a' => Color::LightGreen,
        'b' => Color::LightCyan,
        'c' => Color::LightRed,
        'd' => Color::LightMagenta,
        'e' => Color::LightYellow,
        'f' => Color::White,
        _ => return None,
    };
    Some(color)
}

/// Convert `§`-coded text into a styled terminal line.
pub fn styled_line(text: &str) -> Line<'static> {
    let mut spans = Vec::new();
    let mut style = Style::default().fg(DEFAULT_COLOR);
    let mut buffer = String::new();
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        if ch != '§' {
            buffer.push(ch);
            continue;
        }
        let Some(code) = chars.next() else {
            break;
        };
        if !buffer.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut buffer), style));
        }
        let code = code.to_ascii_lowercase();
        // A color code also clears any active formatting.
        style = match code_color(code) {
            Some(color) => Style::default().fg(color),
            None => match code {
                'l' => style.add_modifier(Modifier::BOLD),
                'm' => style.add_modifier(Modifier::CROSSED_OUT),
                'n' => style.add_modifier(Modifier::UNDERLINED),
                'o' => style.add_modifier(Modifier::ITALIC),
                'r' => Style::default().fg(DEFAULT_COLOR),
                _ => style,
            },
        };
    }

    if !buffer.is_empty() {
        spans.push(Span::styled(buffer, style));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_spans_on_color_codes() {
        let line = styled_line("§6 - §a✔ §f32§7²");
        let texts: Vec<&str> = line.spans.iter().map(|span| span.content.as_ref()).collect();
        assert_eq!(texts, vec![" - ", "✔ ", "32", "²"]);
        assert_eq!(line.spans[0].style.fg, Some(Color::Yellow));
        assert_eq!(line.spans[1].style.fg, Some(Color::LightGreen));
    }

    #[test]
    fn formatting_codes_stack_until_reset() {
        let line = styled_line("§a§lBold§rPlain");
        assert!(line.spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert!(!line.spans[1].style.add_modifier.contains(Modifier::BOLD));
    }
}
