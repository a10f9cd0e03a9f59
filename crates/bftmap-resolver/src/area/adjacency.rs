//! Curated neighbor lists used for cascade expansion.
//!
//! Coverage is partial: every ward has a row, a handful of Tama cities and
//! towns do, and no island does. A missing row means "do not expand", never
//! "unknown area".

pub const ADJACENCY: &[(&str, &[&str])] = &[
    ("千代田区", &["中央区", "港区", "新宿区", "文京区", "台東区"]),
    ("中央区", &["千代田区", "港区", "江東区", "台東区", "墨田区"]),
    ("港区", &["千代田区", "中央区", "新宿区", "渋谷区", "品川区", "江東区"]),
    ("新宿区", &["千代田区", "港区", "渋谷区", "中野区", "豊島区", "文京区"]),
    ("文京区", &["千代田区", "新宿区", "豊島区", "北区", "荒川区", "台東区"]),
    ("台東区", &["千代田区", "中央区", "文京区", "荒川区", "墨田区"]),
    (
        "墨田区",
        &["台東区", "中央区", "江東区", "荒川区", "足立区", "葛飾区", "江戸川区"],
    ),
    ("江東区", &["中央区", "港区", "墨田区", "江戸川区", "品川区"]),
    ("品川区", &["港区", "目黒区", "大田区", "渋谷区", "江東区"]),
    ("目黒区", &["品川区", "渋谷区", "世田谷区", "大田区"]),
    ("大田区", &["品川区", "目黒区", "世田谷区"]),
    (
        "世田谷区",
        &["目黒区", "渋谷区", "杉並区", "大田区", "狛江市", "調布市", "三鷹市"],
    ),
    (
        "渋谷区",
        &["港区", "新宿区", "中野区", "杉並区", "世田谷区", "目黒区", "品川区"],
    ),
    ("中野区", &["新宿区", "渋谷区", "杉並区", "練馬区", "豊島区"]),
    (
        "杉並区",
        &["中野区", "渋谷区", "世田谷区", "練馬区", "武蔵野市", "三鷹市"],
    ),
    ("豊島区", &["新宿区", "文京区", "北区", "板橋区", "練馬区", "中野区"]),
    ("北区", &["豊島区", "文京区", "荒川区", "足立区", "板橋区"]),
    ("荒川区", &["台東区", "文京区", "北区", "足立区", "墨田区"]),
    ("板橋区", &["北区", "豊島区", "練馬区"]),
    (
        "練馬区",
        &["板橋区", "豊島区", "中野区", "杉並区", "武蔵野市", "西東京市"],
    ),
    ("足立区", &["北区", "荒川区", "墨田区", "葛飾区"]),
    ("葛飾区", &["足立区", "墨田区", "江戸川区"]),
    ("江戸川区", &["葛飾区", "墨田区", "江東区"]),
    // Tama cities with curated rows
    ("武蔵野市", &["杉並区", "練馬区", "三鷹市", "西東京市", "小金井市"]),
    ("三鷹市", &["武蔵野市", "杉並区", "世田谷区", "調布市", "小金井市"]),
    ("調布市", &["三鷹市", "世田谷区", "狛江市", "府中市"]),
    ("八王子市", &["日野市", "町田市", "多摩市", "あきる野市"]),
    (
        "立川市",
        &["国立市", "昭島市", "日野市", "国分寺市", "小平市", "東大和市", "武蔵村山市"],
    ),
    ("町田市", &["八王子市", "多摩市", "稲城市"]),
    (
        "府中市",
        &["調布市", "国立市", "国分寺市", "小金井市", "多摩市", "稲城市", "日野市"],
    ),
    // Nishi-Tama
    ("奥多摩町", &["青梅市", "檜原村"]),
    ("日の出町", &["あきる野市", "青梅市"]),
];

/// Neighbor names for `name`, empty when the area has no curated row.
#[must_use]
pub fn neighbor_names(name: &str) -> &'static [&'static str] {
    ADJACENCY
        .iter()
        .find(|(area, _)| *area == name)
        .map_or(&[], |(_, neighbors)| neighbors)
}
