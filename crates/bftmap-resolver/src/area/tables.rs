//! Municipality centroid tables for Tokyo.
//!
//! Coordinates are the municipal office locations, which stand in for the
//! geometric centroid. Table order matters: classification iterates wards,
//! cities, towns, then islands, and the first entry wins an exact tie.

use bftmap_core::AreaKind;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaCentroid {
    pub name: &'static str,
    pub kind: AreaKind,
    pub lat: f64,
    pub lng: f64,
}

const fn ward(name: &'static str, lat: f64, lng: f64) -> AreaCentroid {
    AreaCentroid {
        name,
        kind: AreaKind::Ward,
        lat,
        lng,
    }
}

const fn city(name: &'static str, lat: f64, lng: f64) -> AreaCentroid {
    AreaCentroid {
        name,
        kind: AreaKind::City,
        lat,
        lng,
    }
}

const fn town(name: &'static str, lat: f64, lng: f64) -> AreaCentroid {
    AreaCentroid {
        name,
        kind: AreaKind::Town,
        lat,
        lng,
    }
}

const fn island(name: &'static str, lat: f64, lng: f64) -> AreaCentroid {
    AreaCentroid {
        name,
        kind: AreaKind::Island,
        lat,
        lng,
    }
}

pub const WARDS: &[AreaCentroid] = &[
    ward("千代田区", 35.694_0, 139.753_6),
    ward("中央区", 35.670_7, 139.772_0),
    ward("港区", 35.658_1, 139.751_6),
    ward("新宿区", 35.693_8, 139.703_6),
    ward("文京区", 35.708_1, 139.752_2),
    ward("台東区", 35.712_6, 139.780_0),
    ward("墨田区", 35.710_7, 139.801_5),
    ward("江東区", 35.673_0, 139.817_1),
    ward("品川区", 35.609_2, 139.730_2),
    ward("目黒区", 35.641_4, 139.698_2),
    ward("大田区", 35.561_4, 139.716_1),
    ward("世田谷区", 35.646_4, 139.653_2),
    ward("渋谷区", 35.664_0, 139.698_2),
    ward("中野区", 35.707_4, 139.663_8),
    ward("杉並区", 35.699_5, 139.636_4),
    ward("豊島区", 35.726_3, 139.716_6),
    ward("北区", 35.752_8, 139.733_6),
    ward("荒川区", 35.736_2, 139.783_4),
    ward("板橋区", 35.751_2, 139.709_2),
    ward("練馬区", 35.735_6, 139.651_7),
    ward("足立区", 35.775_0, 139.804_4),
    ward("葛飾区", 35.743_4, 139.847_2),
    ward("江戸川区", 35.706_7, 139.868_3),
];

pub const CITIES: &[AreaCentroid] = &[
    city("八王子市", 35.666_4, 139.316_0),
    city("立川市", 35.713_8, 139.407_7),
    city("武蔵野市", 35.717_8, 139.566_1),
    city("三鷹市", 35.683_6, 139.559_6),
    city("青梅市", 35.788_0, 139.275_8),
    city("府中市", 35.668_9, 139.477_6),
    city("昭島市", 35.705_6, 139.353_5),
    city("調布市", 35.650_6, 139.540_7),
    city("町田市", 35.546_6, 139.438_6),
    city("小金井市", 35.699_5, 139.503_1),
    city("小平市", 35.728_5, 139.477_5),
    city("日野市", 35.671_3, 139.395_0),
    city("東村山市", 35.754_6, 139.468_5),
    city("国分寺市", 35.710_9, 139.462_2),
    city("国立市", 35.683_9, 139.441_4),
    city("福生市", 35.738_7, 139.326_7),
    city("狛江市", 35.634_8, 139.578_7),
    city("東大和市", 35.745_3, 139.426_5),
    city("清瀬市", 35.785_7, 139.526_5),
    city("東久留米市", 35.758_4, 139.529_6),
    city("武蔵村山市", 35.754_8, 139.387_6),
    city("多摩市", 35.636_9, 139.446_3),
    city("稲城市", 35.638_0, 139.504_7),
    city("羽村市", 35.767_6, 139.311_0),
    city("あきる野市", 35.728_9, 139.294_1),
    city("西東京市", 35.725_6, 139.538_3),
];

pub const TOWNS: &[AreaCentroid] = &[
    town("瑞穂町", 35.771_9, 139.354_1),
    town("日の出町", 35.742_0, 139.257_2),
    town("檜原村", 35.726_7, 139.148_6),
    town("奥多摩町", 35.809_4, 139.096_2),
];

pub const ISLANDS: &[AreaCentroid] = &[
    island("大島町", 34.750_2, 139.355_4),
    island("利島村", 34.528_9, 139.280_0),
    island("新島村", 34.377_5, 139.256_9),
    island("神津島村", 34.205_7, 139.134_0),
    island("三宅村", 34.075_7, 139.479_6),
    island("御蔵島村", 33.896_6, 139.603_1),
    island("八丈町", 33.113_0, 139.789_5),
    island("青ヶ島村", 32.466_6, 139.762_7),
    island("小笠原村", 27.094_4, 142.191_6),
];

/// All tables in classification order.
pub const ALL_TABLES: [&[AreaCentroid]; 4] = [WARDS, CITIES, TOWNS, ISLANDS];

/// Iterates every centroid in classification order.
pub fn all_centroids() -> impl Iterator<Item = &'static AreaCentroid> {
    ALL_TABLES.into_iter().flatten()
}

/// Looks a centroid up by exact municipality name.
#[must_use]
pub fn find_centroid(name: &str) -> Option<&'static AreaCentroid> {
    all_centroids().find(|c| c.name == name)
}
