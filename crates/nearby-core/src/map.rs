use crate::domain::Coordinate;

const STATIC_MAP_BASE: &str = "https://developers.onemap.sg/commonapi/staticmap/getStaticImage";
const MAP_LAYER: &str = "night";
const MAP_ZOOM: u8 = 17;
const MAP_SIZE_PX: u16 = 512;

/// Static map image URL centred on `at`.
pub fn static_map_url(at: Coordinate) -> String {
    format!(
        "{STATIC_MAP_BASE}?layerchosen={MAP_LAYER}&lat={}&lng={}&zoom={MAP_ZOOM}&height={MAP_SIZE_PX}&width={MAP_SIZE_PX}",
        at.latitude(),
        at.longitude()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_night_layer_url() {
        let url = static_map_url(Coordinate::new(1.304833, 103.831833).unwrap());
        assert_eq!(
            url,
            "https://developers.onemap.sg/commonapi/staticmap/getStaticImage?layerchosen=night&lat=1.304833&lng=103.831833&zoom=17&height=512&width=512"
        );
    }
}
