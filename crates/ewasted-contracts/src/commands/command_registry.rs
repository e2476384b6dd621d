#[derive(Clone, Copy, Debug)]
pub(crate) struct CommandSpec {
    pub command: &'static str,
    pub action: &'static str,
}

pub(crate) const NO_ARG_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "help",
        action: "help",
    },
    CommandSpec {
        command: "quit",
        action: "quit",
    },
    CommandSpec {
        command: "exit",
        action: "quit",
    },
    CommandSpec {
        command: "prefill",
        action: "contact_prefill",
    },
    CommandSpec {
        command: "chat",
        action: "open_chat",
    },
];

/// Commands taking one file path; quoting follows shell rules.
pub(crate) const SINGLE_PATH_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "image",
        action: "stage_image",
    },
    CommandSpec {
        command: "identify",
        action: "identify",
    },
];

/// Commands whose remaining words form a free-text device type.
pub(crate) const DEVICE_COMMANDS: &[CommandSpec] = &[CommandSpec {
    command: "wipe",
    action: "wipe",
}];

pub(crate) const CENTERS_COMMAND: CommandSpec = CommandSpec {
    command: "centers",
    action: "find_centers",
};

pub(crate) const IMPACT_COMMAND: CommandSpec = CommandSpec {
    command: "impact",
    action: "analyze_impact",
};

pub(crate) const CONTACT_COMMAND: CommandSpec = CommandSpec {
    command: "contact",
    action: "contact",
};

/// Fields accepted by `/contact key=value ...`.
pub(crate) const CONTACT_FIELDS: &[&str] = &["name", "email", "service", "message"];

pub const SHELL_HELP_COMMANDS: &[(&str, &str)] = &[
    ("/image <path>", "stage an image for identification"),
    ("/identify [path]", "identify the staged (or given) image"),
    (
        "/centers [<lat> <lon>] <device>",
        "find up to three recycling centers",
    ),
    (
        "/impact <condition> | <device>",
        "impact analysis (Broken, Minor Issues, Working)",
    ),
    ("/wipe <device>", "data wiping instructions"),
    (
        "/contact name=.. email=.. service=.. message=..",
        "send the contact form",
    ),
    ("/prefill", "prefill the contact message from the last identification"),
    ("/chat", "open the chat assistant"),
    ("/help", "show this list"),
    ("/quit", "leave the shell"),
];
