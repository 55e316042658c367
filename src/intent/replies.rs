//! Canned responses.

use rand::seq::SliceRandom;

/// `{name}` is replaced with the assistant's name.
const GREETINGS: &[&str] = &[
    "Hello! How can I help you?",
    "Hi there! What can I do for you?",
    "Hey! I'm {name}, your PC assistant. What do you need?",
    "Hello! Ready to assist you.",
];

const FALLBACKS: &[&str] = &[
    "I'm not sure about that. Try asking me something else.",
    "I didn't quite get that. Could you rephrase?",
    "I'm still learning. Try saying 'help' to see what I can do.",
    "Sorry, I don't understand that command yet.",
];

const JOKES: &[&str] = &[
    "Why do programmers prefer dark mode? Because light attracts bugs.",
    "There are only 10 kinds of people in this world: those who know binary and those who don't.",
    "A SQL query walks into a bar, walks up to two tables and asks, can I join you?",
    "Why did the developer go broke? Because they used up all their cache.",
    "I would tell you a UDP joke, but you might not get it.",
    "How many programmers does it take to change a light bulb? None, that's a hardware problem.",
    "Why do Java developers wear glasses? Because they don't C sharp.",
    "Debugging is like being the detective in a crime movie where you are also the murderer.",
];

fn pick<'a>(options: &[&'a str]) -> &'a str {
    options
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or_default()
}

pub fn greeting(name: &str) -> String {
    pick(GREETINGS).replace("{name}", name)
}

/// Spoken once when the session starts.
pub fn welcome(name: &str) -> String {
    format!("Hello! I am {name}, your personal assistant. How can I help you today?")
}

pub fn identity(name: &str) -> String {
    format!(
        "I am {name}, your personal assistant. I can help you with tasks, reminders, \
         calculations, system information, and much more!"
    )
}

pub fn help(name: &str) -> String {
    format!(
        "I am {name}, your PC assistant. I can:\n\
         - Tell the time and date\n\
         - Set timers, alarms and reminders\n\
         - Manage your to-do list\n\
         - Take and read notes\n\
         - Manage contacts\n\
         - Do calculations and unit conversions\n\
         - Open applications\n\
         - Report system information\n\
         - Tell jokes, flip coins and roll dice\n\
         - Schedule meetings"
    )
}

pub fn fallback() -> &'static str {
    pick(FALLBACKS)
}

pub fn joke() -> &'static str {
    pick(JOKES)
}

pub const WEATHER: &str = "I can't reach a weather service from here. Check your weather app, \
     or tell me a temperature and I'll convert it for you.";

pub fn definition(word: &str) -> String {
    format!(
        "I can't look up the meaning of '{word}' offline. Please use a dictionary app or search online."
    )
}

pub const GOODBYE: &str = "Goodbye! Have a great day!";
