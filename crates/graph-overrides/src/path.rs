pub const PATH_DELIMITER: char = '.';
const ESCAPE: char = '\\';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionPath {
    pub ancestors: Vec<String>,
    pub leaf: String,
}

impl OptionPath {
    pub fn join(&self) -> String {
        let mut out = String::new();
        for seg in self.ancestors.iter().chain(std::iter::once(&self.leaf)) {
            if !out.is_empty() {
                out.push(PATH_DELIMITER);
            }
            for c in seg.chars() {
                if c == PATH_DELIMITER || c == ESCAPE {
                    out.push(ESCAPE);
                }
                out.push(c);
            }
        }
        out
    }
}

// `\.` is a literal dot and `\\` a literal backslash; any other backslash is kept as is.
pub fn split_path(name: &str) -> OptionPath {
    let mut segments = Vec::new();
    let mut cur = String::new();
    let mut chars = name.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ESCAPE => match chars.peek() {
                Some(&next) if next == PATH_DELIMITER || next == ESCAPE => {
                    cur.push(next);
                    chars.next();
                }
                _ => cur.push(c),
            },
            PATH_DELIMITER => segments.push(std::mem::take(&mut cur)),
            _ => cur.push(c),
        }
    }

    OptionPath {
        ancestors: segments,
        leaf: cur,
    }
}
