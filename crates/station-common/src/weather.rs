//! METAR present-weather strings and WMO `ww` codes.

/// Rewrites applied to METAR weather strings before lookup.
const NORMALIZATIONS: &[(&str, &str)] = &[
    ("-SG", "SG"),
    ("FZBR", "FZFG"),
    ("-BLSN", "BLSN"),
    ("-DRSN", "DRSN"),
    ("-FZUP", "FZDZ"),
];

/// METAR weather groups and their WMO present-weather code.
const METAR_TO_WW: &[(&str, u8)] = &[
    ("", 0),
    ("M", 0),
    ("TSNO", 0),
    ("VA", 4),
    ("FU", 4),
    ("HZ", 5),
    ("DU", 6),
    ("BLDU", 7),
    ("SA", 7),
    ("BLSA", 7),
    ("VCBLSA", 7),
    ("VCBLDU", 7),
    ("BLPY", 7),
    ("PO", 8),
    ("VCPO", 8),
    ("VCDS", 9),
    ("VCSS", 9),
    ("BR", 10),
    ("BCBR", 10),
    ("BC", 11),
    ("MIFG", 12),
    ("VCTS", 13),
    ("VIRGA", 14),
    ("VCSH", 16),
    ("TS", 17),
    ("THDR", 17),
    ("VCTSHZ", 17),
    ("TSFZFG", 17),
    ("TSBR", 17),
    ("TSDZ", 17),
    ("SQ", 18),
    ("FC", 19),
    ("+FC", 19),
    ("DS", 31),
    ("SS", 31),
    ("DRSA", 31),
    ("DRDU", 31),
    ("+DS", 34),
    ("+SS", 34),
    ("DRSN", 36),
    ("+DRSN", 37),
    ("BLSN", 38),
    ("VCBLSN", 38),
    ("+BLSN", 39),
    ("VCFG", 40),
    ("BCFG", 41),
    ("PRFG", 44),
    ("FG", 45),
    ("FZFG", 49),
    ("-DZ", 51),
    ("-DZBR", 51),
    ("-VCTSDZ", 51),
    ("DZ", 53),
    ("VCTSDZ", 53),
    ("+DZ", 55),
    ("+VCTSDZ", 55),
    ("-FZDZ", 56),
    ("-FZDZSN", 56),
    ("FZDZ", 57),
    ("+FZDZ", 57),
    ("FZDZSN", 57),
    ("-DZRA", 58),
    ("DZRA", 59),
    ("+DZRA", 59),
    ("-RA", 61),
    ("-RABR", 61),
    ("-VCTSRA", 61),
    ("RA", 63),
    ("RABR", 63),
    ("RAFG", 63),
    ("VCTSRA", 63),
    ("+RA", 65),
    ("+VCTSRA", 65),
    ("-FZRA", 66),
    ("-FZRASN", 66),
    ("-FZRABR", 66),
    ("-FZRAPL", 66),
    ("FZRA", 67),
    ("+FZRA", 67),
    ("FZRASN", 67),
    ("TSFZRA", 67),
    ("-TSFZRA", 67),
    ("-RASN", 68),
    ("-SNRA", 68),
    ("-DZSN", 68),
    ("-SNDZ", 68),
    ("RASN", 69),
    ("+RASN", 69),
    ("SNRA", 69),
    ("DZSN", 69),
    ("SNDZ", 69),
    ("-SN", 71),
    ("-SNBR", 71),
    ("-VCTSSN", 71),
    ("SN", 73),
    ("VCTSSN", 73),
    ("+SN", 75),
    ("+VCTSSN", 75),
    ("IN", 76),
    ("UP", 76),
    ("-UP", 76),
    ("+UP", 76),
    ("VCTSUP", 76),
    ("SG", 77),
    ("-SNSG", 77),
    ("IC", 78),
    ("PL", 79),
    ("-PL", 79),
    ("+PL", 79),
    ("RAPL", 79),
    ("-RAPL", 79),
    ("SNPL", 79),
    ("-SNPL", 79),
    ("FZRAPL", 79),
    ("-SH", 80),
    ("-SHRA", 80),
    ("SH", 81),
    ("SHRA", 81),
    ("+SH", 81),
    ("+SHRA", 81),
    ("-SHRASN", 83),
    ("-SHSNRA", 83),
    ("SHRASN", 84),
    ("+SHRASN", 84),
    ("SHSNRA", 84),
    ("+SHSNRA", 84),
    ("-SHSN", 85),
    ("SHSN", 86),
    ("+SHSN", 86),
    ("-GS", 87),
    ("-SHGS", 87),
    ("GS", 88),
    ("SHGS", 88),
    ("+GS", 88),
    ("+SHGS", 88),
    ("-GR", 89),
    ("-SHGR", 89),
    ("GR", 90),
    ("SHGR", 90),
    ("+GR", 90),
    ("+SHGR", 90),
    ("-TSRA", 95),
    ("TSRA", 95),
    ("TSSN", 95),
    ("TSPL", 95),
    ("-TSSN", 95),
    ("TSRAGS", 96),
    ("TSGS", 96),
    ("TSGR", 96),
    ("+TSRA", 97),
    ("+TSSN", 97),
    ("TSSA", 98),
    ("TSDS", 98),
    ("TSDU", 98),
    ("+TSGS", 99),
    ("+TSGR", 99),
];

/// Normalize a METAR weather string and keep only its first group.
pub fn normalize_metar_weather(raw: &str) -> String {
    let mut weather = raw.trim().to_string();
    for (from, to) in NORMALIZATIONS {
        weather = weather.replace(from, to);
    }
    weather
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Map a METAR weather string to a WMO present-weather code.
///
/// Returns `None` for groups without a known code.
pub fn metar_to_wmo_code(raw: &str) -> Option<u8> {
    let group = normalize_metar_weather(raw);
    METAR_TO_WW
        .iter()
        .find(|(code, _)| *code == group)
        .map(|(_, ww)| *ww)
}
