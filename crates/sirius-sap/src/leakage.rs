//! Channel bonding leakage matrices.
//!
//! For each NOL channel and bandwidth class, the estimated isolation from
//! transmitting on a candidate channel onto the NOL channel, in matrix
//! units (`LEAKAGE_MAX` means fully isolated). A candidate whose value is
//! at or below `LEAKAGE_THRESHOLD` is too close and is dropped.

use tracing::debug;

use crate::channel::ChannelWidth;
use crate::error::{Result, SapError};

/// Isolation at or below this is rejected
pub const LEAKAGE_THRESHOLD: u16 = 310;
/// Largest value in the tables, also used for channels outside them
pub const LEAKAGE_MAX: u16 = 1000;
/// Static bound on rows (and entries per row) of one matrix
pub const MAX_LEAKAGE_ROWS: usize = 24;

/// Leakage from one NOL channel onto every channel of the matrix
#[derive(Debug)]
pub struct LeakageRow {
    pub channel: u8,
    pub leakage: &'static [(u8, u16)],
}

pub fn matrix(width: ChannelWidth) -> &'static [LeakageRow] {
    match width {
        ChannelWidth::Mhz20 => HT20_LEAKAGE,
        ChannelWidth::Mhz40 => HT40_LEAKAGE,
        ChannelWidth::Mhz80 => VHT80_LEAKAGE,
    }
}

/// Isolation of `candidate` from `nol_channel` at `width`.
pub fn leakage(width: ChannelWidth, nol_channel: u8, candidate: u8) -> u16 {
    matrix(width)
        .iter()
        .find(|row| row.channel == nol_channel)
        .and_then(|row| row.leakage.iter().find(|(ch, _)| *ch == candidate))
        .map(|(_, value)| *value)
        .unwrap_or(LEAKAGE_MAX)
}

/// True if transmitting on `candidate` would leak onto any NOL channel.
pub fn leaks_onto_nol(width: ChannelWidth, nol: &[u8], candidate: u8) -> bool {
    nol.iter()
        .any(|n| leakage(width, *n, candidate) <= LEAKAGE_THRESHOLD)
}

/// Drop every candidate that is not isolated from the NOL channels.
/// Returns how many were removed.
pub fn filter_candidates(width: ChannelWidth, nol: &[u8], candidates: &mut Vec<u8>) -> usize {
    if nol.is_empty() {
        return 0;
    }
    let before = candidates.len();
    candidates.retain(|c| !leaks_onto_nol(width, nol, *c));
    let removed = before - candidates.len();
    if removed > 0 {
        debug!(
            target: "acs",
            width = width.mhz(),
            ?nol,
            "leakage filter removed {} candidates",
            removed
        );
    }
    removed
}

/// Check the compiled-in matrices against their static bounds.
pub fn validate_tables() -> Result<()> {
    for width in [ChannelWidth::Mhz20, ChannelWidth::Mhz40, ChannelWidth::Mhz80] {
        let rows = matrix(width);
        if rows.len() > MAX_LEAKAGE_ROWS {
            return Err(SapError::TableOverflow {
                table: "leakage matrix",
                count: rows.len(),
                max: MAX_LEAKAGE_ROWS,
            });
        }
        for (i, row) in rows.iter().enumerate() {
            if rows[..i].iter().any(|r| r.channel == row.channel) {
                return Err(SapError::invalid_channel(row.channel, "duplicate leakage row"));
            }
            if row.leakage.len() > MAX_LEAKAGE_ROWS {
                return Err(SapError::TableOverflow {
                    table: "leakage row",
                    count: row.leakage.len(),
                    max: MAX_LEAKAGE_ROWS,
                });
            }
            if let Some((ch, v)) = row.leakage.iter().find(|(_, v)| *v > LEAKAGE_MAX) {
                return Err(SapError::config(format!(
                    "leakage {} from {} onto {} exceeds {}",
                    v, row.channel, ch, LEAKAGE_MAX
                )));
            }
        }
    }
    Ok(())
}

/// 20 MHz leakage, row = NOL channel
static HT20_LEAKAGE: &[LeakageRow] = &[
    LeakageRow {
        channel: 36,
        leakage: &[
            (36, 0), (40, 251), (44, 426), (48, 550), (52, 675),
            (56, 790), (60, 885), (64, 960), (100, 1000), (104, 1000),
            (108, 1000), (112, 1000), (116, 1000), (120, 1000), (124, 1000),
            (128, 1000), (132, 1000), (136, 1000), (140, 1000), (144, 1000),
        ],
    },
    LeakageRow {
        channel: 40,
        leakage: &[
            (36, 244), (40, 0), (44, 254), (48, 429), (52, 553),
            (56, 678), (60, 793), (64, 888), (100, 1000), (104, 1000),
            (108, 1000), (112, 1000), (116, 1000), (120, 1000), (124, 1000),
            (128, 1000), (132, 1000), (136, 1000), (140, 1000), (144, 1000),
        ],
    },
    LeakageRow {
        channel: 44,
        leakage: &[
            (36, 412), (40, 247), (44, 0), (48, 257), (52, 411),
            (56, 556), (60, 681), (64, 796), (100, 1000), (104, 1000),
            (108, 1000), (112, 1000), (116, 1000), (120, 1000), (124, 1000),
            (128, 1000), (132, 1000), (136, 1000), (140, 1000), (144, 1000),
        ],
    },
    LeakageRow {
        channel: 48,
        leakage: &[
            (36, 550), (40, 415), (44, 250), (48, 0), (52, 260),
            (56, 414), (60, 559), (64, 684), (100, 1000), (104, 1000),
            (108, 1000), (112, 1000), (116, 1000), (120, 1000), (124, 1000),
            (128, 1000), (132, 1000), (136, 1000), (140, 1000), (144, 1000),
        ],
    },
    LeakageRow {
        channel: 52,
        leakage: &[
            (36, 689), (40, 553), (44, 418), (48, 253), (52, 0),
            (56, 242), (60, 417), (64, 562), (100, 1000), (104, 1000),
            (108, 1000), (112, 1000), (116, 1000), (120, 1000), (124, 1000),
            (128, 1000), (132, 1000), (136, 1000), (140, 1000), (144, 1000),
        ],
    },
    LeakageRow {
        channel: 56,
        leakage: &[
            (36, 797), (40, 671), (44, 556), (48, 421), (52, 256),
            (56, 0), (60, 245), (64, 420), (100, 1000), (104, 1000),
            (108, 1000), (112, 1000), (116, 1000), (120, 1000), (124, 1000),
            (128, 1000), (132, 1000), (136, 1000), (140, 1000), (144, 1000),
        ],
    },
    LeakageRow {
        channel: 60,
        leakage: &[
            (36, 885), (40, 800), (44, 674), (48, 559), (52, 424),
            (56, 259), (60, 0), (64, 248), (100, 1000), (104, 1000),
            (108, 1000), (112, 1000), (116, 1000), (120, 1000), (124, 1000),
            (128, 1000), (132, 1000), (136, 1000), (140, 1000), (144, 1000),
        ],
    },
    LeakageRow {
        channel: 64,
        leakage: &[
            (36, 953), (40, 888), (44, 782), (48, 677), (52, 562),
            (56, 427), (60, 241), (64, 0), (100, 1000), (104, 1000),
            (108, 1000), (112, 1000), (116, 1000), (120, 1000), (124, 1000),
            (128, 1000), (132, 1000), (136, 1000), (140, 1000), (144, 1000),
        ],
    },
    LeakageRow {
        channel: 100,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 0), (104, 257),
            (108, 411), (112, 556), (116, 681), (120, 796), (124, 870),
            (128, 945), (132, 1000), (136, 1000), (140, 1000), (144, 1000),
        ],
    },
    LeakageRow {
        channel: 104,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 250), (104, 0),
            (108, 260), (112, 414), (116, 559), (120, 684), (124, 799),
            (128, 873), (132, 948), (136, 1000), (140, 1000), (144, 1000),
        ],
    },
    LeakageRow {
        channel: 108,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 418), (104, 253),
            (108, 0), (112, 242), (116, 417), (120, 562), (124, 687),
            (128, 781), (132, 876), (136, 951), (140, 1000), (144, 1000),
        ],
    },
    LeakageRow {
        channel: 112,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 556), (104, 421),
            (108, 256), (112, 0), (116, 245), (120, 420), (124, 565),
            (128, 690), (132, 784), (136, 879), (140, 954), (144, 1000),
        ],
    },
    LeakageRow {
        channel: 116,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 674), (104, 559),
            (108, 424), (112, 259), (116, 0), (120, 248), (124, 423),
            (128, 568), (132, 672), (136, 787), (140, 882), (144, 957),
        ],
    },
    LeakageRow {
        channel: 120,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 782), (104, 677),
            (108, 562), (112, 427), (116, 241), (120, 0), (124, 251),
            (128, 426), (132, 550), (136, 675), (140, 790), (144, 885),
        ],
    },
    LeakageRow {
        channel: 124,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 870), (104, 785),
            (108, 680), (112, 565), (116, 430), (120, 244), (124, 0),
            (128, 254), (132, 429), (136, 553), (140, 678), (144, 793),
        ],
    },
    LeakageRow {
        channel: 128,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 959), (104, 873),
            (108, 788), (112, 683), (116, 568), (120, 412), (124, 247),
            (128, 0), (132, 257), (136, 411), (140, 556), (144, 681),
        ],
    },
    LeakageRow {
        channel: 132,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 1000), (104, 941),
            (108, 876), (112, 791), (116, 686), (120, 550), (124, 415),
            (128, 250), (132, 0), (136, 260), (140, 414), (144, 559),
        ],
    },
    LeakageRow {
        channel: 136,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 1000), (104, 1000),
            (108, 944), (112, 879), (116, 794), (120, 689), (124, 553),
            (128, 418), (132, 253), (136, 0), (140, 242), (144, 417),
        ],
    },
    LeakageRow {
        channel: 140,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 1000), (104, 1000),
            (108, 1000), (112, 947), (116, 882), (120, 797), (124, 671),
            (128, 556), (132, 421), (136, 256), (140, 0), (144, 245),
        ],
    },
    LeakageRow {
        channel: 144,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 1000), (104, 1000),
            (108, 1000), (112, 1000), (116, 950), (120, 885), (124, 800),
            (128, 674), (132, 559), (136, 424), (140, 259), (144, 0),
        ],
    },
];

/// 40 MHz leakage, row = NOL channel
static HT40_LEAKAGE: &[LeakageRow] = &[
    LeakageRow {
        channel: 36,
        leakage: &[
            (36, 0), (40, 121), (44, 356), (48, 340), (52, 515),
            (56, 520), (60, 705), (64, 710), (100, 1000), (104, 1000),
            (108, 1000), (112, 1000), (116, 1000), (120, 1000), (124, 1000),
            (128, 1000), (132, 1000), (136, 1000), (140, 1000), (144, 1000),
        ],
    },
    LeakageRow {
        channel: 40,
        leakage: &[
            (36, 114), (40, 0), (44, 354), (48, 359), (52, 513),
            (56, 518), (60, 703), (64, 708), (100, 1000), (104, 1000),
            (108, 1000), (112, 1000), (116, 1000), (120, 1000), (124, 1000),
            (128, 1000), (132, 1000), (136, 1000), (140, 1000), (144, 1000),
        ],
    },
    LeakageRow {
        channel: 44,
        leakage: &[
            (36, 342), (40, 347), (44, 0), (48, 127), (52, 341),
            (56, 346), (60, 521), (64, 526), (100, 1000), (104, 1000),
            (108, 1000), (112, 1000), (116, 1000), (120, 1000), (124, 1000),
            (128, 1000), (132, 1000), (136, 1000), (140, 1000), (144, 1000),
        ],
    },
    LeakageRow {
        channel: 48,
        leakage: &[
            (36, 340), (40, 345), (44, 120), (48, 0), (52, 360),
            (56, 344), (60, 519), (64, 524), (100, 1000), (104, 1000),
            (108, 1000), (112, 1000), (116, 1000), (120, 1000), (124, 1000),
            (128, 1000), (132, 1000), (136, 1000), (140, 1000), (144, 1000),
        ],
    },
    LeakageRow {
        channel: 52,
        leakage: &[
            (36, 529), (40, 513), (44, 348), (48, 353), (52, 0),
            (56, 112), (60, 347), (64, 352), (100, 1000), (104, 1000),
            (108, 1000), (112, 1000), (116, 1000), (120, 1000), (124, 1000),
            (128, 1000), (132, 1000), (136, 1000), (140, 1000), (144, 1000),
        ],
    },
    LeakageRow {
        channel: 56,
        leakage: &[
            (36, 527), (40, 511), (44, 346), (48, 351), (52, 126),
            (56, 0), (60, 345), (64, 350), (100, 1000), (104, 1000),
            (108, 1000), (112, 1000), (116, 1000), (120, 1000), (124, 1000),
            (128, 1000), (132, 1000), (136, 1000), (140, 1000), (144, 1000),
        ],
    },
    LeakageRow {
        channel: 60,
        leakage: &[
            (36, 705), (40, 710), (44, 514), (48, 519), (52, 354),
            (56, 359), (60, 0), (64, 118), (100, 1000), (104, 1000),
            (108, 1000), (112, 1000), (116, 1000), (120, 1000), (124, 1000),
            (128, 1000), (132, 1000), (136, 1000), (140, 1000), (144, 1000),
        ],
    },
    LeakageRow {
        channel: 64,
        leakage: &[
            (36, 703), (40, 708), (44, 512), (48, 517), (52, 352),
            (56, 357), (60, 111), (64, 0), (100, 1000), (104, 1000),
            (108, 1000), (112, 1000), (116, 1000), (120, 1000), (124, 1000),
            (128, 1000), (132, 1000), (136, 1000), (140, 1000), (144, 1000),
        ],
    },
    LeakageRow {
        channel: 100,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 0), (104, 127),
            (108, 341), (112, 346), (116, 521), (120, 526), (124, 690),
            (128, 695), (132, 850), (136, 855), (140, 1000), (144, 1000),
        ],
    },
    LeakageRow {
        channel: 104,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 120), (104, 0),
            (108, 360), (112, 344), (116, 519), (120, 524), (124, 709),
            (128, 693), (132, 848), (136, 853), (140, 1000), (144, 1000),
        ],
    },
    LeakageRow {
        channel: 108,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 348), (104, 353),
            (108, 0), (112, 112), (116, 347), (120, 352), (124, 527),
            (128, 511), (132, 696), (136, 701), (140, 856), (144, 840),
        ],
    },
    LeakageRow {
        channel: 112,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 346), (104, 351),
            (108, 126), (112, 0), (116, 345), (120, 350), (124, 525),
            (128, 530), (132, 694), (136, 699), (140, 854), (144, 859),
        ],
    },
    LeakageRow {
        channel: 116,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 514), (104, 519),
            (108, 354), (112, 359), (116, 0), (120, 118), (124, 353),
            (128, 358), (132, 512), (136, 517), (140, 702), (144, 707),
        ],
    },
    LeakageRow {
        channel: 120,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 512), (104, 517),
            (108, 352), (112, 357), (116, 111), (120, 0), (124, 351),
            (128, 356), (132, 510), (136, 515), (140, 700), (144, 705),
        ],
    },
    LeakageRow {
        channel: 124,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 690), (104, 695),
            (108, 520), (112, 525), (116, 360), (120, 344), (124, 0),
            (128, 124), (132, 359), (136, 343), (140, 518), (144, 523),
        ],
    },
    LeakageRow {
        channel: 128,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 709), (104, 693),
            (108, 518), (112, 523), (116, 358), (120, 342), (124, 117),
            (128, 0), (132, 357), (136, 341), (140, 516), (144, 521),
        ],
    },
    LeakageRow {
        channel: 132,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 857), (104, 841),
            (108, 696), (112, 701), (116, 526), (120, 510), (124, 345),
            (128, 350), (132, 0), (136, 130), (140, 344), (144, 349),
        ],
    },
    LeakageRow {
        channel: 136,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 855), (104, 860),
            (108, 694), (112, 699), (116, 524), (120, 529), (124, 343),
            (128, 348), (132, 123), (136, 0), (140, 342), (144, 347),
        ],
    },
    LeakageRow {
        channel: 140,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 1000), (104, 1000),
            (108, 842), (112, 847), (116, 702), (120, 707), (124, 511),
            (128, 516), (132, 351), (136, 356), (140, 0), (144, 115),
        ],
    },
    LeakageRow {
        channel: 144,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 1000), (104, 1000),
            (108, 840), (112, 845), (116, 700), (120, 705), (124, 530),
            (128, 514), (132, 349), (136, 354), (140, 129), (144, 0),
        ],
    },
];

/// 80 MHz leakage, row = NOL channel
static VHT80_LEAKAGE: &[LeakageRow] = &[
    LeakageRow {
        channel: 36,
        leakage: &[
            (36, 0), (40, 101), (44, 106), (48, 90), (52, 400),
            (56, 430), (60, 460), (64, 490), (100, 1000), (104, 1000),
            (108, 1000), (112, 1000), (116, 1000), (120, 1000), (124, 1000),
            (128, 1000), (132, 1000), (136, 1000), (140, 1000), (144, 1000),
        ],
    },
    LeakageRow {
        channel: 40,
        leakage: &[
            (36, 94), (40, 0), (44, 104), (48, 109), (52, 373),
            (56, 403), (60, 433), (64, 463), (100, 1000), (104, 1000),
            (108, 1000), (112, 1000), (116, 1000), (120, 1000), (124, 1000),
            (128, 1000), (132, 1000), (136, 1000), (140, 1000), (144, 1000),
        ],
    },
    LeakageRow {
        channel: 44,
        leakage: &[
            (36, 92), (40, 97), (44, 0), (48, 107), (52, 346),
            (56, 376), (60, 406), (64, 436), (100, 1000), (104, 1000),
            (108, 1000), (112, 1000), (116, 1000), (120, 1000), (124, 1000),
            (128, 1000), (132, 1000), (136, 1000), (140, 1000), (144, 1000),
        ],
    },
    LeakageRow {
        channel: 48,
        leakage: &[
            (36, 90), (40, 95), (44, 100), (48, 0), (52, 340),
            (56, 349), (60, 379), (64, 409), (100, 1000), (104, 1000),
            (108, 1000), (112, 1000), (116, 1000), (120, 1000), (124, 1000),
            (128, 1000), (132, 1000), (136, 1000), (140, 1000), (144, 1000),
        ],
    },
    LeakageRow {
        channel: 52,
        leakage: &[
            (36, 414), (40, 373), (44, 353), (48, 333), (52, 0),
            (56, 92), (60, 97), (64, 102), (100, 1000), (104, 1000),
            (108, 1000), (112, 1000), (116, 1000), (120, 1000), (124, 1000),
            (128, 1000), (132, 1000), (136, 1000), (140, 1000), (144, 1000),
        ],
    },
    LeakageRow {
        channel: 56,
        leakage: &[
            (36, 437), (40, 396), (44, 376), (48, 356), (52, 106),
            (56, 0), (60, 95), (64, 100), (100, 1000), (104, 1000),
            (108, 1000), (112, 1000), (116, 1000), (120, 1000), (124, 1000),
            (128, 1000), (132, 1000), (136, 1000), (140, 1000), (144, 1000),
        ],
    },
    LeakageRow {
        channel: 60,
        leakage: &[
            (36, 460), (40, 440), (44, 399), (48, 379), (52, 104),
            (56, 109), (60, 0), (64, 98), (100, 1000), (104, 1000),
            (108, 1000), (112, 1000), (116, 1000), (120, 1000), (124, 1000),
            (128, 1000), (132, 1000), (136, 1000), (140, 1000), (144, 1000),
        ],
    },
    LeakageRow {
        channel: 64,
        leakage: &[
            (36, 483), (40, 463), (44, 422), (48, 402), (52, 102),
            (56, 107), (60, 91), (64, 0), (100, 1000), (104, 1000),
            (108, 1000), (112, 1000), (116, 1000), (120, 1000), (124, 1000),
            (128, 1000), (132, 1000), (136, 1000), (140, 1000), (144, 1000),
        ],
    },
    LeakageRow {
        channel: 100,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 0), (104, 107),
            (108, 91), (112, 96), (116, 406), (120, 436), (124, 445),
            (128, 475), (132, 650), (136, 655), (140, 660), (144, 644),
        ],
    },
    LeakageRow {
        channel: 104,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 100), (104, 0),
            (108, 110), (112, 94), (116, 379), (120, 409), (124, 439),
            (128, 448), (132, 648), (136, 653), (140, 658), (144, 642),
        ],
    },
    LeakageRow {
        channel: 108,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 98), (104, 103),
            (108, 0), (112, 92), (116, 352), (120, 382), (124, 412),
            (128, 421), (132, 646), (136, 651), (140, 656), (144, 640),
        ],
    },
    LeakageRow {
        channel: 112,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 96), (104, 101),
            (108, 106), (112, 0), (116, 325), (120, 355), (124, 385),
            (128, 415), (132, 644), (136, 649), (140, 654), (144, 659),
        ],
    },
    LeakageRow {
        channel: 116,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 399), (104, 379),
            (108, 359), (112, 339), (116, 0), (120, 98), (124, 103),
            (128, 108), (132, 397), (136, 427), (140, 457), (144, 487),
        ],
    },
    LeakageRow {
        channel: 120,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 422), (104, 402),
            (108, 382), (112, 362), (116, 91), (120, 0), (124, 101),
            (128, 106), (132, 370), (136, 400), (140, 430), (144, 460),
        ],
    },
    LeakageRow {
        channel: 124,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 445), (104, 425),
            (108, 405), (112, 385), (116, 110), (120, 94), (124, 0),
            (128, 104), (132, 364), (136, 373), (140, 403), (144, 433),
        ],
    },
    LeakageRow {
        channel: 128,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 489), (104, 448),
            (108, 428), (112, 408), (116, 108), (120, 92), (124, 97),
            (128, 0), (132, 337), (136, 346), (140, 376), (144, 406),
        ],
    },
    LeakageRow {
        channel: 132,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 657), (104, 641),
            (108, 646), (112, 651), (116, 411), (120, 370), (124, 350),
            (128, 330), (132, 0), (136, 110), (140, 94), (144, 99),
        ],
    },
    LeakageRow {
        channel: 136,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 655), (104, 660),
            (108, 644), (112, 649), (116, 434), (120, 414), (124, 373),
            (128, 353), (132, 103), (136, 0), (140, 92), (144, 97),
        ],
    },
    LeakageRow {
        channel: 140,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 653), (104, 658),
            (108, 642), (112, 647), (116, 457), (120, 437), (124, 396),
            (128, 376), (132, 101), (136, 106), (140, 0), (144, 95),
        ],
    },
    LeakageRow {
        channel: 144,
        leakage: &[
            (36, 1000), (40, 1000), (44, 1000), (48, 1000), (52, 1000),
            (56, 1000), (60, 1000), (64, 1000), (100, 651), (104, 656),
            (108, 640), (112, 645), (116, 480), (120, 460), (124, 440),
            (128, 399), (132, 99), (136, 104), (140, 109), (144, 0),
        ],
    },
];
