/// Greedy word wrap. Each input line keeps its leading indentation on every
/// line it is wrapped into.
pub fn wrap_text(text: &str, max_width: usize) -> String {
    let mut wrapped = Vec::new();

    for line in text.lines() {
        if line.len() <= max_width {
            wrapped.push(line.to_string());
            continue;
        }

        let indent_len = line.len() - line.trim_start().len();
        let indent = &line[..indent_len];
        let mut current = String::from(indent);

        for word in line.split_whitespace() {
            let pending = current.len() > indent_len;
            if pending && current.len() + 1 + word.len() > max_width {
                wrapped.push(std::mem::replace(&mut current, String::from(indent)));
            }
            if current.len() > indent_len {
                current.push(' ');
            }
            current.push_str(word);
        }

        if current.len() > indent_len {
            wrapped.push(current);
        }
    }

    wrapped.join("\n")
}
