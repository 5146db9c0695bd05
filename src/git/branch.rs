//! Naming scheme for stacked branches.
//!
//! A managed branch is named `<prefix><split><base>[<split>part-<N.N>]`,
//! e.g. `wh/login-page/part-1.5`. Each stack also has a start branch,
//! `<prefix><split>starts<split><base>[<split>part-<N.N>]`, marking the
//! commit the part was cut from.

const PART_MARKER: &str = "part-";
const START_MARKER: &str = "starts";

/// The prefix and separator used to build and parse managed branch names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchNaming {
    prefix: String,
    split: String,
}

impl BranchNaming {
    /// An empty `prefix` means branch names carry no prefix segment
    pub fn new(prefix: &str, split: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            split: split.to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn split(&self) -> &str {
        &self.split
    }

    fn prefix_segment(&self) -> Option<String> {
        if self.prefix.is_empty() {
            None
        } else {
            Some(format!("{}{}", self.prefix, self.split))
        }
    }

    /// Split a branch name into prefix, base and part.
    ///
    /// A `part-` suffix that is not a number is kept as part of the base.
    pub fn parse(&self, name: &str) -> ParsedBranch {
        let (prefix, rest) = match self
            .prefix_segment()
            .and_then(|segment| name.strip_prefix(segment.as_str()))
        {
            Some(rest) => (Some(self.prefix.clone()), rest),
            None => (None, name),
        };

        let part_separator = format!("{}{}", self.split, PART_MARKER);
        let (base, part) = match rest.rsplit_once(part_separator.as_str()) {
            Some((base, part)) => match parse_part(part) {
                Some(part) => (base, Some(part)),
                None => (rest, None),
            },
            None => (rest, None),
        };

        ParsedBranch {
            prefix,
            base: base.to_string(),
            part,
        }
    }

    /// True for names carrying this naming's prefix segment
    pub fn is_managed(&self, name: &str) -> bool {
        match self.prefix_segment() {
            Some(segment) => name.starts_with(segment.as_str()),
            None => true,
        }
    }

    /// True for start branches of a stack
    pub fn is_start_branch(&self, name: &str) -> bool {
        let marker = format!("{}{}", START_MARKER, self.split);
        match self.prefix_segment() {
            Some(segment) => name.starts_with(&format!("{}{}", segment, marker)),
            None => name.starts_with(&marker),
        }
    }

    /// Keep the managed names, preserving order
    pub fn managed<'a>(&self, names: &'a [String]) -> Vec<&'a str> {
        names
            .iter()
            .map(String::as_str)
            .filter(|name| self.is_managed(name))
            .collect()
    }

    /// The parts of stack `base`, ordered by part number (unnumbered first)
    pub fn stack(&self, names: &[String], base: &str) -> Vec<ParsedBranch> {
        let mut branches: Vec<ParsedBranch> = self
            .managed(names)
            .into_iter()
            .filter(|name| !self.is_start_branch(name))
            .map(|name| self.parse(name))
            .filter(|branch| branch.base == base)
            .collect();
        branches.sort_by(|a, b| a.part.cmp(&b.part));
        branches
    }

    fn join(&self, segments: &[Option<&str>]) -> String {
        segments
            .iter()
            .flatten()
            .copied()
            .collect::<Vec<_>>()
            .join(self.split.as_str())
    }
}

impl Default for BranchNaming {
    fn default() -> Self {
        Self::new("", "/")
    }
}

/// A branch name decomposed by [`BranchNaming::parse`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBranch {
    pub prefix: Option<String>,
    pub base: String,
    /// Part number in hundredths: `part-1.5` is 150
    pub part: Option<u32>,
}

impl ParsedBranch {
    /// The local branch name
    pub fn full(&self, naming: &BranchNaming) -> String {
        let part = self.part.map(format_part);
        naming.join(&[self.prefix.as_deref(), Some(self.base.as_str()), part.as_deref()])
    }

    /// The start branch name for this part
    pub fn start(&self, naming: &BranchNaming) -> String {
        let part = self.part.map(format_part);
        naming.join(&[
            self.prefix.as_deref(),
            Some(START_MARKER),
            Some(self.base.as_str()),
            part.as_deref(),
        ])
    }

    /// The remote-tracking name of [`ParsedBranch::full`]
    pub fn remote_full(&self, naming: &BranchNaming, remote: &str) -> String {
        format!("{}/{}", remote, self.full(naming))
    }

    /// The remote-tracking name of [`ParsedBranch::start`]
    pub fn remote_start(&self, naming: &BranchNaming, remote: &str) -> String {
        format!("{}/{}", remote, self.start(naming))
    }
}

/// Parse `N`, `N.D` or `N.DD` into hundredths
pub fn parse_part(text: &str) -> Option<u32> {
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (text, ""),
    };
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if fraction.len() > 2 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let whole: u32 = whole.parse().ok()?;
    let hundredths = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<u32>().ok()? * 10,
        _ => fraction.parse::<u32>().ok()?,
    };
    whole.checked_mul(100)?.checked_add(hundredths)
}

/// Render hundredths as `part-N.D`, or `part-N.DD` when needed
pub fn format_part(part: u32) -> String {
    let (whole, hundredths) = (part / 100, part % 100);
    if hundredths % 10 == 0 {
        format!("{}{}.{}", PART_MARKER, whole, hundredths / 10)
    } else {
        format!("{}{}.{:02}", PART_MARKER, whole, hundredths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naming() -> BranchNaming {
        BranchNaming::new("wh", "/")
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_full_name() {
        let parsed = naming().parse("wh/login-page/part-1.5");
        assert_eq!(parsed.prefix.as_deref(), Some("wh"));
        assert_eq!(parsed.base, "login-page");
        assert_eq!(parsed.part, Some(150));
    }

    #[test]
    fn test_parse_without_part_or_prefix() {
        let parsed = naming().parse("wh/login-page");
        assert_eq!(parsed.base, "login-page");
        assert_eq!(parsed.part, None);

        let foreign = naming().parse("someone/else");
        assert_eq!(foreign.prefix, None);
        assert_eq!(foreign.base, "someone/else");
    }

    #[test]
    fn test_parse_non_numeric_part_stays_in_base() {
        let parsed = naming().parse("wh/login/part-two");
        assert_eq!(parsed.base, "login/part-two");
        assert_eq!(parsed.part, None);
    }

    #[test]
    fn test_custom_split() {
        let naming = BranchNaming::new("wh", "-");
        let parsed = naming.parse("wh-login-part-2.0");
        assert_eq!(parsed.base, "login");
        assert_eq!(parsed.part, Some(200));
        assert_eq!(parsed.full(&naming), "wh-login-part-2.0");
        assert_eq!(parsed.start(&naming), "wh-starts-login-part-2.0");
    }

    #[test]
    fn test_names_round_trip_through_parse() {
        let naming = naming();
        for name in ["wh/login/part-1.0", "wh/login/part-1.25", "wh/login", "other"] {
            assert_eq!(naming.parse(name).full(&naming), name);
        }
    }

    #[test]
    fn test_start_and_remote_names() {
        let naming = naming();
        let parsed = naming.parse("wh/login/part-1.5");

        assert_eq!(parsed.start(&naming), "wh/starts/login/part-1.5");
        assert_eq!(parsed.remote_full(&naming, "origin"), "origin/wh/login/part-1.5");
        assert_eq!(
            parsed.remote_start(&naming, "origin"),
            "origin/wh/starts/login/part-1.5"
        );
        assert!(naming.is_start_branch(&parsed.start(&naming)));
        assert!(!naming.is_start_branch(&parsed.full(&naming)));
    }

    #[test]
    fn test_managed_filters_by_prefix_segment() {
        let all = names(&["main", "wh/a", "whx/b", "wh/starts/a"]);
        assert_eq!(naming().managed(&all), vec!["wh/a", "wh/starts/a"]);
        assert_eq!(BranchNaming::default().managed(&all).len(), 4);
    }

    #[test]
    fn test_stack_sorted_by_part() {
        let all = names(&[
            "wh/login/part-2.0",
            "main",
            "wh/login/part-1.5",
            "wh/starts/login/part-1.5",
            "wh/signup/part-1.0",
            "wh/login",
            "wh/login/part-10.0",
        ]);
        let naming = naming();
        let stack: Vec<String> = naming
            .stack(&all, "login")
            .iter()
            .map(|b| b.full(&naming))
            .collect();

        assert_eq!(
            stack,
            vec![
                "wh/login",
                "wh/login/part-1.5",
                "wh/login/part-2.0",
                "wh/login/part-10.0"
            ]
        );
    }

    #[test]
    fn test_parse_part() {
        assert_eq!(parse_part("1"), Some(100));
        assert_eq!(parse_part("1.5"), Some(150));
        assert_eq!(parse_part("0.29"), Some(29));
        assert_eq!(parse_part("1.234"), None);
        assert_eq!(parse_part(".5"), None);
        assert_eq!(parse_part("-1"), None);
        assert_eq!(parse_part("two"), None);
    }

    #[test]
    fn test_format_part() {
        assert_eq!(format_part(100), "part-1.0");
        assert_eq!(format_part(150), "part-1.5");
        assert_eq!(format_part(125), "part-1.25");
        assert_eq!(format_part(5), "part-0.05");
    }
}
