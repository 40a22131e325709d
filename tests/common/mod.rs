//! Shared fixtures: an in-test FCS file builder.

#![allow(dead_code)]

/// Assembles FCS files byte by byte
pub struct FcsBuilder {
    version: &'static str,
    keywords: Vec<(String, String)>,
    data: Vec<u8>,
}

impl FcsBuilder {
    pub fn new(version: &'static str) -> Self {
        Self {
            version,
            keywords: Vec::new(),
            data: Vec::new(),
        }
    }

    pub fn keyword(mut self, key: &str, value: &str) -> Self {
        self.keywords.push((key.to_string(), value.to_string()));
        self
    }

    /// `$PnN`, `$PnB`, `$PnR` and optionally `$PnS` for parameter `n`
    pub fn parameter(self, n: usize, name: &str, stain: Option<&str>, bits: u32, range: u32) -> Self {
        let mut b = self
            .keyword(&format!("$P{n}N"), name)
            .keyword(&format!("$P{n}B"), &bits.to_string())
            .keyword(&format!("$P{n}R"), &range.to_string())
            .keyword(&format!("$P{n}E"), "0,0");
        if let Some(stain) = stain {
            b = b.keyword(&format!("$P{n}S"), stain);
        }
        b
    }

    pub fn data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        const HEADER_LEN: usize = 58;
        let render = |begin: usize, end: usize| {
            let mut text = String::from("|");
            for (k, v) in &self.keywords {
                text.push_str(&format!("{}|{}|", k, v.replace('|', "||")));
            }
            text.push_str(&format!("$BEGINDATA|{begin:012}|$ENDDATA|{end:012}|"));
            text.into_bytes()
        };

        let text_end = HEADER_LEN + render(0, 0).len() - 1;
        let (data_begin, data_end) = if self.data.is_empty() {
            (0, 0)
        } else {
            (text_end + 1, text_end + self.data.len())
        };

        let mut bytes = format!(
            "{}    {:>8}{:>8}{:>8}{:>8}{:>8}{:>8}",
            self.version, HEADER_LEN, text_end, data_begin, data_end, 0, 0
        )
        .into_bytes();
        bytes.extend_from_slice(&render(data_begin, data_end));
        bytes.extend_from_slice(&self.data);
        bytes
    }
}

/// Event-interleave columns as little-endian doubles
pub fn doubles_le(columns: &[&[f64]]) -> Vec<u8> {
    let events = columns.first().map_or(0, |c| c.len());
    let mut out = Vec::with_capacity(events * columns.len() * 8);
    for event in 0..events {
        for column in columns {
            out.extend_from_slice(&column[event].to_le_bytes());
        }
    }
    out
}

/// Event-interleave columns as big-endian 16-bit integers
pub fn u16_be(columns: &[&[u16]]) -> Vec<u8> {
    let events = columns.first().map_or(0, |c| c.len());
    let mut out = Vec::with_capacity(events * columns.len() * 2);
    for event in 0..events {
        for column in columns {
            out.extend_from_slice(&column[event].to_be_bytes());
        }
    }
    out
}

/// Small scatter-only file with `events` integer events
pub fn scatter_file(name: &str, events: u16) -> Vec<u8> {
    let fsc: Vec<u16> = (0..events).map(|i| 100 + i * 10).collect();
    let ssc: Vec<u16> = (0..events).map(|i| 50 + i * 5).collect();
    FcsBuilder::new("FCS3.0")
        .keyword("$PAR", "2")
        .keyword("$TOT", &events.to_string())
        .keyword("$DATATYPE", "I")
        .keyword("$BYTEORD", "4,3,2,1")
        .keyword("$MODE", "L")
        .keyword("$FIL", name)
        .parameter(1, "FSC-H", None, 16, 1024)
        .parameter(2, "SSC-H", None, 16, 1024)
        .data(u16_be(&[&fsc, &ssc]))
        .build()
}
