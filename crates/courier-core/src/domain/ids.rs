//! Domain identifiers (strongly-typed IDs).
//!
//! ULID ベースの ID を Phantom type で包んでいます。
//!
//! ## ULID の特性
//! - **時刻でソート可能**: 古い item から順に並べられる
//! - **分散生成可能**: producer 側で調整なしに採番できる
//! - **文字列表現**: SQLite の TEXT 列にそのまま保存できる

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use ulid::Ulid;

/// IdMarker は各 ID 型のマーカー trait
///
/// Display で使うプレフィックス（"item-" など）を提供します。
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// ジェネリック ID 型
///
/// `T` は PhantomData で、実行時にはメモリを消費しません。
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

/// Parses both the bare ULID (storage form) and the prefixed display form.
impl<T: IdMarker> FromStr for Id<T> {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix(T::prefix()).unwrap_or(s);
        Ulid::from_string(raw).map(Self::from_ulid)
    }
}

/// DispatchItem のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Item {}

impl IdMarker for Item {
    fn prefix() -> &'static str {
        "item-"
    }
}

/// Identifier of a pending dispatch item (store-assigned, used for deletion).
pub type ItemId = Id<Item>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_item_prefix() {
        let ulid = Ulid::new();
        let id = ItemId::from_ulid(ulid);

        assert_eq!(id.as_ulid(), ulid);
        assert_eq!(id.to_string(), format!("item-{ulid}"));
    }

    #[test]
    fn parses_prefixed_and_bare_forms() {
        let id = ItemId::from_ulid(Ulid::new());

        let from_display: ItemId = id.to_string().parse().unwrap();
        let from_bare: ItemId = id.as_ulid().to_string().parse().unwrap();

        assert_eq!(from_display, id);
        assert_eq!(from_bare, id);
        assert!("item-not-a-ulid".parse::<ItemId>().is_err());
    }

    #[test]
    fn ulid_ids_are_sortable() {
        let id1 = ItemId::from_ulid(Ulid::new());
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = ItemId::from_ulid(Ulid::new());

        assert!(id1 < id2);
    }

    #[test]
    fn phantom_data_does_not_consume_memory() {
        use std::mem::size_of;

        assert_eq!(size_of::<ItemId>(), size_of::<Ulid>());
    }
}
