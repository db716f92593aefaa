use crate::store::SeedPair;

/// Words every user starts with: basic colours and personal pronouns.
pub const COMMON_WORDS: &[SeedPair] = &[
    SeedPair { native: "красный", target: "red" },
    SeedPair { native: "синий", target: "blue" },
    SeedPair { native: "зеленый", target: "green" },
    SeedPair { native: "желтый", target: "yellow" },
    SeedPair { native: "черный", target: "black" },
    SeedPair { native: "белый", target: "white" },
    SeedPair { native: "я", target: "I" },
    SeedPair { native: "ты", target: "you" },
    SeedPair { native: "он", target: "he" },
    SeedPair { native: "она", target: "she" },
];
