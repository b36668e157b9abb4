use std::fmt;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MaybeStringWrapped<T> {
    Str(String),
    Val(T),
}

impl<T: ToString> MaybeStringWrapped<T> {
    pub fn into_string(self) -> String {
        match self {
            MaybeStringWrapped::Str(s) => s,
            MaybeStringWrapped::Val(v) => v.to_string(),
        }
    }
}

/// Service ids come back as either a JSON string or a bare number
pub fn deserialize_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: MaybeStringWrapped<u64> = Deserialize::deserialize(deserializer)?;
    Ok(value.into_string())
}

/// Reads a JSON object as a list of pairs, keeping the order of the file
pub fn deserialize_ordered_pairs<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PairsVisitor;

    impl<'de> Visitor<'de> for PairsVisitor {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an object of string values")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, value)) = map.next_entry::<String, String>()? {
                pairs.push((key, value));
            }
            Ok(pairs)
        }
    }

    deserializer.deserialize_map(PairsVisitor)
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Deserialize)]
    struct Service {
        #[serde(deserialize_with = "deserialize_string_or_number")]
        service: String,
    }

    #[derive(Deserialize)]
    struct Abbreviations {
        #[serde(deserialize_with = "deserialize_ordered_pairs")]
        pairs: Vec<(String, String)>,
    }

    #[test]
    fn test_service_as_number_or_string() {
        let s: Service = serde_json::from_str(r#"{"service": 24673004}"#).unwrap();
        assert_eq!(s.service, "24673004");

        let s: Service = serde_json::from_str(r#"{"service": "G12345"}"#).unwrap();
        assert_eq!(s.service, "G12345");
    }

    #[test]
    fn test_pairs_keep_file_order() {
        let a: Abbreviations =
            serde_json::from_str(r#"{"pairs": {"Road": "Rd", "London": "Ldn", "Cross": "X"}}"#)
                .unwrap();
        assert_eq!(
            a.pairs,
            vec![
                ("Road".to_string(), "Rd".to_string()),
                ("London".to_string(), "Ldn".to_string()),
                ("Cross".to_string(), "X".to_string()),
            ]
        );
    }
}
