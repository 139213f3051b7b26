use serde_json::{Map, Value};

use super::BookId;

/// コマンド：書籍を登録する
///
/// payloadはリクエストボディのJSONオブジェクト（未検証）。
#[derive(Debug, Clone, PartialEq)]
pub struct CreateBook {
    pub payload: Map<String, Value>,
}

/// コマンド：書籍を部分更新する
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateBook {
    pub book_id: BookId,
    pub payload: Map<String, Value>,
}
