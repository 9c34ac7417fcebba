use std::{collections::BTreeSet, fmt::Display, str::FromStr};

use anyhow::{ensure, Context};
use itertools::Itertools;

// -----------------------------------------------------------------------------
// CalendarSymAtom
// -----------------------------------------------------------------------------
/// Name of a single, non-combined calendar.
///
/// This is just a string with some constraints.
/// - It should not be empty.
/// - It should consist of ASCII alphanumeric characters and underscore.
///
/// Atoms are joined with `+` to create a [`CalendarSym`].
///
/// # Examples
/// ```
/// use qcalendar::calendar::CalendarSymAtom;
///
/// let sym = CalendarSymAtom::new("GBLO");
/// assert!(sym.is_ok());
/// assert_eq!(sym.unwrap().as_str(), "GBLO");
///
/// let sym = CalendarSymAtom::new("GBLO+USNY");
/// assert!(sym.is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String")]
pub struct CalendarSymAtom(String);

//
// ser/de
//
impl FromStr for CalendarSymAtom {
    type Err = anyhow::Error;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CalendarSymAtom {
    type Error = anyhow::Error;

    #[inline]
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl Display for CalendarSymAtom {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl schemars::JsonSchema for CalendarSymAtom {
    fn schema_name() -> String {
        "CalendarSymAtom".to_owned()
    }
    fn schema_id() -> std::borrow::Cow<'static, str> {
        "qcalendar::calendar::CalendarSymAtom".into()
    }
    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        let mut sch = <String as schemars::JsonSchema>::json_schema(gen).into_object();
        sch.metadata().description =
            Some("Name of a single calendar. Only alphanumeric characters or '_' are allowed.".to_owned());
        sch.string().pattern = Some("^[A-Za-z0-9_]+$".to_owned());
        sch.metadata().examples = vec!["GBLO".into(), "SatSun".into()];
        sch.into()
    }
}

//
// ctors
//
impl CalendarSymAtom {
    /// Create a new [`CalendarSymAtom`] from a string.
    ///
    /// # Errors
    /// - If the given string is empty.
    /// - If the given string contains any non-alphanumeric characters other than underscore.
    pub fn new(name: impl Into<String>) -> Result<Self, anyhow::Error> {
        let name: String = name.into();
        ensure!(!name.is_empty(), "Calendar name should not be empty");
        ensure!(
            name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_'),
            "Invalid calendar name '{name}': only ASCII alphanumerics and '_' are allowed"
        );
        Ok(Self(name))
    }
}

//
// methods
//
impl CalendarSymAtom {
    /// Get the inner string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// -----------------------------------------------------------------------------
// CalendarSym
// -----------------------------------------------------------------------------
/// Name of a calendar, possibly combined from several single calendars.
///
/// A symbol is a non-empty set of [`CalendarSymAtom`]s.
/// Its string representation joins the atoms in sorted order with `+`, e.g. `GBLO+USNY`.
/// Parsing accepts the atoms in any order and with duplicates,
/// so `USNY+GBLO+USNY` and `GBLO+USNY` are the same symbol.
///
/// # Examples
/// ```
/// use qcalendar::calendar::CalendarSym;
///
/// let sym: CalendarSym = "USNY+GBLO".parse().unwrap();
/// assert_eq!(sym.to_string(), "GBLO+USNY");
/// assert_eq!(sym.leaves().count(), 2);
///
/// assert!("GBLO+".parse::<CalendarSym>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarSym(BTreeSet<CalendarSymAtom>);

//
// ser/de
//
impl FromStr for CalendarSym {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        peg::parser!( grammar cal_sym() for str {
            rule atom() -> CalendarSymAtom
                = sym:$(['a'..='z' | 'A'..='Z' | '0'..='9' | '_']+) {
                    CalendarSymAtom(sym.to_owned())
                }
                / expected!("name of single calendar")

            pub(crate) rule parse() -> Vec<CalendarSymAtom>
                = atoms:(atom() ++ "+") { atoms }
        });
        cal_sym::parse(s)
            .map_err(|e| anyhow::anyhow!(e))
            .and_then(Self::from_iter_nonempty)
            .with_context(|| format!("Invalid calendar name: '{s}'"))
    }
}

impl Display for CalendarSym {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join("+"))
    }
}

impl serde::Serialize for CalendarSym {
    #[inline]
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for CalendarSym {
    #[inline]
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        CalendarSym::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl schemars::JsonSchema for CalendarSym {
    fn schema_name() -> String {
        "CalendarSym".to_owned()
    }
    fn schema_id() -> std::borrow::Cow<'static, str> {
        "qcalendar::calendar::CalendarSym".into()
    }
    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        let mut sch = <String as schemars::JsonSchema>::json_schema(gen).into_object();
        sch.metadata().description = Some(
            "Name of a calendar. Combined calendars are written as '+' separated names of single calendars.".to_owned(),
        );
        sch.metadata().examples = vec!["GBLO".into(), "GBLO+USNY".into()];
        sch.into()
    }
}

//
// ctors
//
impl From<CalendarSymAtom> for CalendarSym {
    #[inline]
    fn from(atom: CalendarSymAtom) -> Self {
        Self(BTreeSet::from([atom]))
    }
}

impl CalendarSym {
    /// Create a symbol of a single calendar.
    ///
    /// # Errors
    /// - If the given string is not a valid [`CalendarSymAtom`].
    #[inline]
    pub fn single_of(name: impl Into<String>) -> Result<Self, anyhow::Error> {
        CalendarSymAtom::new(name).map(Self::from)
    }

    /// Create a symbol combining the given atoms.
    ///
    /// # Errors
    /// - If the given iterator is empty.
    pub fn from_iter_nonempty(
        atoms: impl IntoIterator<Item = CalendarSymAtom>,
    ) -> Result<Self, anyhow::Error> {
        let set: BTreeSet<_> = atoms.into_iter().collect();
        ensure!(!set.is_empty(), "Empty set of calendar names");
        Ok(Self(set))
    }
}

//
// methods
//
impl CalendarSym {
    /// Iterate over the names of single calendars in sorted order.
    #[inline]
    pub fn leaves(&self) -> impl ExactSizeIterator<Item = &CalendarSymAtom> + '_ {
        self.0.iter()
    }

    /// Get the atom if this symbol names a single calendar.
    #[inline]
    pub fn as_single(&self) -> Option<&CalendarSymAtom> {
        match self.0.len() {
            1 => self.0.first(),
            _ => None,
        }
    }
}

impl std::ops::BitOr for CalendarSym {
    type Output = Self;

    #[inline]
    fn bitor(mut self, rhs: Self) -> Self::Output {
        self.0.extend(rhs.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("GBLO", true)]
    #[case("TK_OSE", true)]
    #[case("SatSun", true)]
    #[case("GBLO+USNY", false)]
    #[case("(GBLO)", false)]
    #[case("", false)]
    #[case(" ", false)]
    #[case("😃", false)]
    fn test_atom_new(#[case] s: &str, #[case] ok: bool) {
        let sym = CalendarSymAtom::new(s);

        if ok {
            assert_eq!(sym.unwrap().as_str(), s);
        } else {
            assert!(sym.is_err());
        }
    }

    #[rstest]
    #[case("GBLO", &["GBLO"])]
    #[case("GBLO+USNY", &["GBLO", "USNY"])]
    #[case("USNY+GBLO", &["GBLO", "USNY"])]
    #[case("USNY+GBLO+USNY", &["GBLO", "USNY"])]
    #[case("c+b+a", &["a", "b", "c"])]
    fn test_from_str(#[case] s: &str, #[case] expected: &[&str]) {
        let sym: CalendarSym = s.parse().unwrap();

        let leaves = sym.leaves().map(CalendarSymAtom::as_str).collect::<Vec<_>>();
        assert_eq!(leaves, expected);
    }

    #[rstest]
    #[case("")]
    #[case("+")]
    #[case("GBLO+")]
    #[case("+GBLO")]
    #[case("GBLO++USNY")]
    #[case("GBLO + USNY")]
    #[case(" GBLO")]
    #[case("GBLO|USNY")]
    #[case("😃")]
    fn test_from_str_ng(#[case] s: &str) {
        let parsed = CalendarSym::from_str(s);

        assert!(parsed.is_err());
    }

    #[rstest]
    #[case("GBLO", "GBLO")]
    #[case("USNY+GBLO", "GBLO+USNY")]
    #[case("b+a+b", "a+b")]
    fn test_display(#[case] s: &str, #[case] expected: &str) {
        let sym: CalendarSym = s.parse().unwrap();

        assert_eq!(sym.to_string(), expected);
    }

    #[test]
    fn test_as_single() {
        let sym = CalendarSym::single_of("GBLO").unwrap();
        assert_eq!(sym.as_single().map(CalendarSymAtom::as_str), Some("GBLO"));

        let sym: CalendarSym = "GBLO+USNY".parse().unwrap();
        assert_eq!(sym.as_single(), None);
    }

    #[test]
    fn test_from_iter_nonempty() {
        let sym = CalendarSym::from_iter_nonempty(["B".parse().unwrap(), "A".parse().unwrap()]);
        assert_eq!(sym.unwrap().to_string(), "A+B");

        let sym = CalendarSym::from_iter_nonempty([]);
        assert!(sym.is_err());
    }

    #[rstest]
    #[case("GBLO", "USNY", "GBLO+USNY")]
    #[case("GBLO", "GBLO", "GBLO")]
    #[case("USNY+JPTO", "GBLO+USNY", "GBLO+JPTO+USNY")]
    fn test_bitor(#[case] lhs: &str, #[case] rhs: &str, #[case] expected: &str) {
        let lhs: CalendarSym = lhs.parse().unwrap();
        let rhs: CalendarSym = rhs.parse().unwrap();

        let sym = lhs | rhs;

        assert_eq!(sym.to_string(), expected);
    }

    #[rstest]
    #[case("GBLO")]
    #[case("GBLO+USNY")]
    fn test_serde(#[case] s: &str) {
        let sym: CalendarSym = s.parse().unwrap();

        let ser = serde_json::to_string(&sym).unwrap();
        assert_eq!(ser, format!("\"{s}\""));

        let de: CalendarSym = serde_json::from_str(&ser).unwrap();
        assert_eq!(de, sym);

        let de = serde_json::from_str::<CalendarSym>("\"GBLO+\"");
        assert!(de.is_err());
    }

    #[test]
    fn test_atom_serde() {
        let atom: CalendarSymAtom = serde_json::from_str("\"GBLO\"").unwrap();
        assert_eq!(atom.as_str(), "GBLO");

        let atom = serde_json::from_str::<CalendarSymAtom>("\"GBLO+USNY\"");
        assert!(atom.is_err());

        let atom: CalendarSymAtom = "TK_OSE".parse().unwrap();
        assert_eq!(serde_json::to_string(&atom).unwrap(), "\"TK_OSE\"");
    }
}
