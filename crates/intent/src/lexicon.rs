//! Static lexicons for rule-based intent classification.
//!
//! Single words match whole tokens; entries containing a space are phrase
//! anchors matched against the normalized joined text.  All lists are
//! frozen: the classifier must stay a pure function of its input text.

/// Distress/affect vocabulary.  Any hit marks the turn emotional.
pub const EMOTIONAL_WORDS: &[&str] = &[
    "heavy", "tired", "exhausted", "drained", "overwhelmed", "sad", "low",
    "alone", "lonely", "empty", "numb", "broken", "hopeless", "worthless",
    "anxious", "scared", "afraid", "worried", "stressed", "upset", "hurting",
    "crying", "lost", "stuck", "suffocating", "miserable", "burnout",
    // Hinglish / romanized Hindi
    "bhaari", "thaka", "thak", "akela", "udaas", "pareshan", "dard",
    "ghabrahat", "bechain", "tension",
    // Devanagari
    "भारी", "थक", "थकान", "अकेला", "उदास", "परेशान", "दर्द",
];

/// Family-theme vocabulary.  Latches the `family` theme onto the session.
pub const FAMILY_WORDS: &[&str] = &[
    "family", "mother", "father", "mom", "dad", "parents", "brother",
    "sister", "husband", "wife", "marriage", "in-laws", "son", "daughter",
    "maa", "papa", "bhai", "behen", "ghar", "shaadi", "sasural", "beta",
    "परिवार", "माँ", "पिता", "भाई", "बहन", "घर", "शादी",
];

/// Resignation/futility vocabulary.  Forces skeleton C with a latched
/// escalation state.
pub const RESIGNATION_WORDS: &[&str] = &[
    "pointless", "futile", "meaningless", "hopeless", "bekaar", "बेकार",
];

/// Resignation phrase anchors.
pub const RESIGNATION_PHRASES: &[&str] = &[
    "no point", "what is the use", "whats the use", "nothing matters",
    "given up", "give up", "haar maan", "koi fayda nahi",
];

/// Self-harm anchors that mark severity `critical`.
pub const SELF_HARM_CRITICAL_PHRASES: &[&str] = &[
    "end it all", "kill myself", "end my life", "want to die",
    "better off dead", "marna chahta", "marna chahti", "jeena nahi chahta",
    "jeena nahi chahti",
];

/// Self-harm anchors that mark severity at least `high`.
pub const SELF_HARM_HIGH_PHRASES: &[&str] = &[
    "hurt myself", "harm myself", "no reason to live", "disappear forever",
    "khud ko nuksan",
];

/// Escalation intensifiers.  Single strong signals of a worsening state;
/// deliberately excludes soft amplifiers like "really" and "very".
pub const ESCALATION_PHRASES: &[&str] = &[
    "cant take", "can not take", "not anymore", "any more of this",
    "getting worse", "too much for me", "unbearable", "breaking down",
    "aur nahi ho raha", "bardaasht nahi",
];

/// Help-seeking anchors.  An emotional turn carrying one asks for a small
/// concrete step, which routes to the micro-action skeleton.
pub const ACTION_SEEKING_PHRASES: &[&str] = &[
    "what can i do", "what do i do", "what can i even do", "help me calm",
    "how do i calm", "kya karoon", "kya karun", "kuch batao",
];

/// Requests the engine refuses outright.
pub const REFUSAL_PHRASES: &[&str] = &[
    "how to hurt someone", "how to hit", "dosage of", "overdose on",
    "revenge on",
];

/// Romanized-Hindi function words used for the hinglish language hint.
pub const HINGLISH_MARKERS: &[&str] = &[
    "hai", "hain", "nahi", "yeh", "woh", "bahut", "mein", "raha", "rahi",
    "lag", "kuch", "aaj", "mujhe", "mera", "meri", "bhi", "toh", "kar",
];
