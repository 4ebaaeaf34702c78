use serde::{Deserialize, Deserializer, Serialize};

/// Strips an optional `0x` / `0X` prefix from a hex string.
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s)
}

/// Decodes a hex string (with or without `0x` prefix) into a fixed-size array.
pub fn decode_hex_array<const N: usize>(s: &str) -> Result<[u8; N], hex::FromHexError> {
    let mut result = [0u8; N];
    hex::decode_to_slice(strip_hex_prefix(s), &mut result)?;
    Ok(result)
}

pub fn to_hex<S>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    format!("0x{}", hex::encode(bytes)).serialize(s)
}

pub fn from_hex<'de, D>(de: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let hex_str = String::deserialize(de)?;
    hex::decode(strip_hex_prefix(&hex_str)).map_err(|e| serde::de::Error::custom(format!("Invalid hex string: {e}")))
}

pub fn array_to_hex<S, const N: usize>(bytes: &[u8; N], s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    to_hex(bytes.as_slice(), s)
}

pub fn array_from_hex<'de, D, const N: usize>(de: D) -> Result<[u8; N], D::Error>
where
    D: Deserializer<'de>,
{
    let hex_str = String::deserialize(de)?;
    decode_hex_array(&hex_str).map_err(|e| serde::de::Error::custom(format!("Invalid hex string: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Wrapped {
        #[serde(serialize_with = "array_to_hex", deserialize_with = "array_from_hex")]
        word: [u8; 4],
        #[serde(serialize_with = "to_hex", deserialize_with = "from_hex")]
        blob: Vec<u8>,
    }

    #[test]
    fn prefix_is_optional() {
        assert_eq!(strip_hex_prefix("0xabcd"), "abcd");
        assert_eq!(strip_hex_prefix("0XABCD"), "ABCD");
        assert_eq!(strip_hex_prefix("abcd"), "abcd");
        assert_eq!(decode_hex_array::<2>("0xbeef").unwrap(), [0xbe, 0xef]);
        assert_eq!(decode_hex_array::<2>("beef").unwrap(), [0xbe, 0xef]);
        assert!(decode_hex_array::<3>("beef").is_err());
    }

    #[test]
    fn serde_hex_fields() {
        let value = Wrapped { word: [1, 2, 3, 4], blob: vec![0xff] };
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"word":"0x01020304","blob":"0xff"}"#);
        let back: Wrapped = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
        assert!(serde_json::from_str::<Wrapped>(r#"{"word":"0x0102","blob":"0xff"}"#).is_err());
    }
}
