// Document: Rc-wrapped dynamic value that every path operation works on

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// Insertion-ordered mapping used for object documents.
pub type Map = IndexMap<String, Document>;

/// A dynamically-shaped document.
///
/// Strings and containers sit behind `Rc`, so cloning a document never copies
/// its contents. Writes go through the `*_mut` accessors, which copy a shared
/// container first; other handles to the old document keep seeing it unchanged.
#[derive(Clone, Debug, Default)]
pub enum Document {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Array(Rc<Vec<Document>>),
    Object(Rc<Map>),
}

/// `n` as an integer, when it is whole and in range.
fn integral(n: f64) -> Option<i64> {
    (n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64).then_some(n as i64)
}

impl Document {
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Document::String(s.into())
    }

    pub fn array(items: Vec<Document>) -> Self {
        Document::Array(Rc::new(items))
    }

    pub fn object(map: Map) -> Self {
        Document::Object(Rc::new(map))
    }

    /// An object holding exactly one member. Autovivification builds these.
    pub fn single(key: impl Into<String>, value: Document) -> Self {
        let mut map = Map::with_capacity(1);
        map.insert(key.into(), value);
        Document::object(map)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Document::Object(_))
    }

    /// Variant name, for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Document::Null => "null",
            Document::Bool(_) => "bool",
            Document::Number(_) => "number",
            Document::String(_) => "string",
            Document::Array(_) => "array",
            Document::Object(_) => "object",
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Document::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Whole numbers only; `2.5` gives `None`.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_f64().and_then(integral)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Document::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Document>> {
        match self {
            Document::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Document::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Document>> {
        match self {
            Document::Array(items) => Some(Rc::make_mut(items)),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Map> {
        match self {
            Document::Object(map) => Some(Rc::make_mut(map)),
            _ => None,
        }
    }

    /// Member `key` of an object; `None` for anything else.
    pub fn get(&self, key: &str) -> Option<&Document> {
        self.as_object()?.get(key)
    }

    /// Element `index` of an array; `None` for anything else.
    pub fn get_index(&self, index: usize) -> Option<&Document> {
        self.as_array()?.get(index)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Document> {
        self.as_object_mut()?.get_mut(key)
    }

    pub fn get_index_mut(&mut self, index: usize) -> Option<&mut Document> {
        self.as_array_mut()?.get_mut(index)
    }

    /// Compact JSON text. Non-finite numbers are written as `null`.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json_str(text: &str) -> Result<Document, serde_json::Error> {
        serde_json::from_str(text)
    }
}

macro_rules! number_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Document {
                fn from(n: $ty) -> Self {
                    Document::Number(n as f64)
                }
            }
        )*
    };
}

number_from!(i32, i64, usize);

impl From<f64> for Document {
    fn from(n: f64) -> Self {
        Document::Number(n)
    }
}

impl From<bool> for Document {
    fn from(b: bool) -> Self {
        Document::Bool(b)
    }
}

impl From<&str> for Document {
    fn from(s: &str) -> Self {
        Document::string(s)
    }
}

impl From<String> for Document {
    fn from(s: String) -> Self {
        Document::string(s)
    }
}

/// Deep equality. Shared containers compare by pointer first.
impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        use Document::*;
        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Number(a), Number(b)) => a == b,
            (String(a), String(b)) => a == b,
            (Array(a), Array(b)) => Rc::ptr_eq(a, b) || a == b,
            (Object(a), Object(b)) => Rc::ptr_eq(a, b) || a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.to_json_string().map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Document::Null => serializer.serialize_unit(),
            Document::Bool(b) => serializer.serialize_bool(*b),
            Document::Number(n) if !n.is_finite() => serializer.serialize_unit(),
            Document::Number(n) => match integral(*n) {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(*n),
            },
            Document::String(s) => serializer.serialize_str(s),
            Document::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                items.iter().try_for_each(|item| seq.serialize_element(item))?;
                seq.end()
            }
            Document::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map.iter() {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

impl<'de> serde::Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DocumentVisitor)
    }
}

struct DocumentVisitor;

impl<'de> Visitor<'de> for DocumentVisitor {
    type Value = Document;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a JSON document")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Document, E> {
        Ok(Document::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Document, E> {
        Ok(Document::Null)
    }

    fn visit_bool<E: de::Error>(self, b: bool) -> Result<Document, E> {
        Ok(Document::Bool(b))
    }

    fn visit_i64<E: de::Error>(self, n: i64) -> Result<Document, E> {
        Ok(Document::from(n))
    }

    fn visit_u64<E: de::Error>(self, n: u64) -> Result<Document, E> {
        Ok(Document::Number(n as f64))
    }

    fn visit_f64<E: de::Error>(self, n: f64) -> Result<Document, E> {
        Ok(Document::Number(n))
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Document, E> {
        Ok(Document::string(s))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Document, A::Error> {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Document::array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Document, A::Error> {
        let mut map = Map::new();
        while let Some((key, value)) = access.next_entry::<String, Document>()? {
            map.insert(key, value);
        }
        Ok(Document::object(map))
    }
}

/// Build a [`Document`] from a JSON-like literal.
///
/// ```
/// use docpath::document;
///
/// let doc = document!({"name": "ada", "tags": ["a", "b"], "boss": null});
/// assert_eq!(doc.get("name").and_then(|v| v.as_str()), Some("ada"));
/// ```
///
/// Anything that is not `null`, `true`, `false`, an array or an object goes
/// through `Document::from`. Wrap negative numbers in parentheses: `document!([(-1)])`.
#[macro_export]
macro_rules! document {
    (null) => {
        $crate::value::Document::Null
    };
    (true) => {
        $crate::value::Document::Bool(true)
    };
    (false) => {
        $crate::value::Document::Bool(false)
    };
    ([ $($item:tt),* $(,)? ]) => {
        $crate::value::Document::array(vec![ $( $crate::document!($item) ),* ])
    };
    ({ $($key:tt : $value:tt),* $(,)? }) => {{
        #[allow(unused_mut)]
        let mut map = $crate::value::Map::new();
        $( map.insert(($key).to_string(), $crate::document!($value)); )*
        $crate::value::Document::object(map)
    }};
    ($other:expr) => {
        $crate::value::Document::from($other)
    };
}
