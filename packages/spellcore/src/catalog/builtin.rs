//! Built-in spell shapes, defined as raw point lists in an arbitrary
//! coordinate space. Exact values do not matter: the catalogue normalizes
//! and resamples every pattern before it is matched against. Circular
//! strokes use a clock-face layout around their centre.

pub(crate) type RawXy = (i16, i16);

/// Clockwise circle from the top plus a line down through the centre,
/// like turning a key.
const UNLOCK: &[RawXy] = &[
    (512, 184),
    (653, 243),
    (712, 384),
    (653, 525),
    (512, 584),
    (371, 525),
    (312, 384),
    (371, 243),
    (512, 184),
    (512, 184),
    (512, 384),
    (512, 584),
    (512, 684),
];

/// Z with an extended tail.
const TERMINATE: &[RawXy] = &[
    (200, 200),
    (512, 200),
    (824, 200),
    (612, 342),
    (400, 484),
    (200, 584),
    (512, 602),
    (824, 620),
];

/// Closed triangle starting at the lower left.
const IGNITE: &[RawXy] = &[
    (200, 600),
    (356, 400),
    (512, 200),
    (668, 400),
    (824, 600),
    (512, 600),
    (200, 600),
];

/// V stroke.
const GUST: &[RawXy] = &[
    (200, 200),
    (356, 350),
    (512, 500),
    (668, 350),
    (824, 200),
];

/// Three-quarter arc then a line down.
const LOWER: &[RawXy] = &[
    (400, 600),
    (500, 573),
    (573, 500),
    (600, 400),
    (573, 300),
    (500, 227),
    (400, 200),
    (300, 227),
    (227, 650),
    (227, 800),
];

/// Three-quarter arc the other way, then a line up.
const RAISE: &[RawXy] = &[
    (400, 200),
    (500, 227),
    (573, 300),
    (600, 400),
    (573, 500),
    (500, 573),
    (400, 600),
    (300, 573),
    (227, 500),
    (300, 77),
    (300, -73),
];

/// A "4": vertical, diagonal down-left, horizontal right.
const MOVE: &[RawXy] = &[
    (650, 600),
    (650, 400),
    (650, 200),
    (425, 300),
    (200, 400),
    (512, 400),
    (824, 400),
];

/// Half circle left to right, then down.
const LEVITATE: &[RawXy] = &[
    (312, 300),
    (339, 400),
    (412, 473),
    (512, 500),
    (612, 473),
    (685, 400),
    (712, 300),
    (712, 650),
];

/// Half circle right to left, then down.
const SILENCE: &[RawXy] = &[
    (712, 300),
    (685, 400),
    (612, 473),
    (512, 500),
    (412, 473),
    (339, 400),
    (312, 300),
    (312, 650),
];

/// Capital M.
const HALT: &[RawXy] = &[
    (200, 600),
    (275, 400),
    (350, 200),
    (431, 325),
    (512, 450),
    (593, 325),
    (674, 200),
    (749, 400),
    (824, 600),
];

/// Capital W.
const RESUME: &[RawXy] = &[
    (200, 200),
    (275, 400),
    (350, 600),
    (431, 475),
    (512, 350),
    (593, 475),
    (674, 600),
    (749, 400),
    (824, 200),
];

/// Five-point star drawn in one stroke.
const ILLUMINATE: &[RawXy] = &[
    (320, 775),
    (512, 186),
    (703, 775),
    (202, 441),
    (821, 441),
    (320, 775),
];

/// Slash down-left, back up the left edge, slash down-right.
const DARK: &[RawXy] = &[
    (824, 200),
    (488, 484),
    (152, 768),
    (152, 484),
    (152, 200),
    (488, 484),
    (824, 768),
];

pub(crate) const BUILTINS: &[(&str, &[RawXy])] = &[
    ("Unlock", UNLOCK),
    ("Terminate", TERMINATE),
    ("Ignite", IGNITE),
    ("Gust", GUST),
    ("Lower", LOWER),
    ("Raise", RAISE),
    ("Move", MOVE),
    ("Levitate", LEVITATE),
    ("Silence", SILENCE),
    ("Halt", HALT),
    ("Resume", RESUME),
    ("Illuminate", ILLUMINATE),
    ("Dark", DARK),
];
