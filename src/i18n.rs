//! Translation lookup for user-facing text
//!
//! Catalogs are static, flattened `section.key` tables, one per [`Locale`].
//! A [`Translator`] is a small context object that is constructed once at
//! startup and passed to whatever needs to print user-facing text.
//!
//! Resolution order is: the translator's locale, then the default locale
//! (`en`), then the literal key.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A flattened translation catalog of `(key, text)` pairs
pub type Catalog = &'static [(&'static str, &'static str)];

/// Supported interface locales
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English (default)
    #[default]
    En,
    /// Russian
    Ru,
}

impl Locale {
    /// Parse a locale tag such as `en`, `ru`, `ru-RU` or `ru_RU.UTF-8`
    ///
    /// # Examples
    ///
    /// ```
    /// use studymate::i18n::Locale;
    ///
    /// assert_eq!(Locale::parse_str("ru_RU.UTF-8"), Some(Locale::Ru));
    /// assert_eq!(Locale::parse_str("EN"), Some(Locale::En));
    /// assert_eq!(Locale::parse_str("de"), None);
    /// ```
    pub fn parse_str(tag: &str) -> Option<Self> {
        let primary = tag
            .split(|c: char| c == '-' || c == '_' || c == '.')
            .next()
            .unwrap_or_default()
            .to_lowercase();
        match primary.as_str() {
            "en" => Some(Self::En),
            "ru" => Some(Self::Ru),
            _ => None,
        }
    }

    /// English name of the language, used to instruct the model's output language
    pub fn language_name(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Ru => "Russian",
        }
    }

    /// Short locale code
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ru => "ru",
        }
    }

    fn catalog(&self) -> Catalog {
        match self {
            Self::En => EN,
            Self::Ru => RU,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Detect the interface locale from `LC_ALL`, then `LANG`
///
/// Anything other than Russian resolves to English.
pub fn detect_system_locale() -> Locale {
    let lc_all = std::env::var("LC_ALL").ok();
    let lang = std::env::var("LANG").ok();
    detect_locale_from(lc_all.as_deref(), lang.as_deref())
}

fn detect_locale_from(lc_all: Option<&str>, lang: Option<&str>) -> Locale {
    lc_all
        .filter(|v| !v.is_empty())
        .or(lang.filter(|v| !v.is_empty()))
        .and_then(Locale::parse_str)
        .unwrap_or_default()
}

/// Look `key` up in `primary`, then in `fallback`, then return the key itself
pub fn resolve<'a>(primary: Catalog, fallback: Catalog, key: &'a str) -> &'a str {
    lookup(primary, key)
        .or_else(|| lookup(fallback, key))
        .unwrap_or(key)
}

fn lookup(catalog: Catalog, key: &str) -> Option<&'static str> {
    catalog
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, text)| *text)
}

/// Locale-bound translation context
///
/// # Examples
///
/// ```
/// use studymate::i18n::{Locale, Translator};
///
/// let t = Translator::new(Locale::Ru);
/// assert_eq!(t.t("modes.tutor"), "Репетитор");
/// assert_eq!(t.t("no.such.key"), "no.such.key");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Translator {
    locale: Locale,
}

impl Translator {
    /// Create a translator for the given locale
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    /// Active locale
    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Switch the active locale
    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
    }

    /// Translate a dotted key
    pub fn t<'a>(&self, key: &'a str) -> &'a str {
        resolve(self.locale.catalog(), Locale::default().catalog(), key)
    }
}

const EN: Catalog = &[
    ("header.title", "Studymate"),
    ("modes.solver", "Solver"),
    ("modes.sketcher", "Sketcher"),
    ("modes.scheduler", "Scheduler"),
    ("modes.tutor", "Tutor"),
    ("buttons.solving", "Solving..."),
    ("buttons.sketching", "Sketching..."),
    ("buttons.planning", "Planning..."),
    ("buttons.replying", "Replying..."),
    ("buttons.applying", "Applying..."),
    ("buttons.addEvent", "Add Event"),
    ("buttons.cheatSheet", "Cheat Sheet"),
    ("buttons.creating", "Creating..."),
    ("buttons.practice", "Practice"),
    ("buttons.generating", "Generating..."),
    (
        "homeworkInput.solverPlaceholder",
        "Type your question here... e.g., 'What is the Pythagorean theorem?'",
    ),
    (
        "homeworkInput.sketcherPlaceholder",
        "Describe the sketch you want to create... e.g., 'A simple diagram of a plant cell'",
    ),
    (
        "homeworkInput.schedulerPlaceholder",
        "Describe your week... e.g., 'I have classes M/W/F from 9-11am, a job T/Th evenings, and need to study for a history exam.'",
    ),
    (
        "homeworkInput.tutorPlaceholder",
        "Ask a question to start your tutoring session...",
    ),
    ("solutionDisplay.generating", "Generating solution..."),
    ("solutionDisplay.generatingHint", "This may take a moment."),
    ("solutionDisplay.errorTitle", "An Error Occurred"),
    ("solutionDisplay.placeholderTitle", "Your solution will appear here"),
    ("solutionDisplay.solution", "Solution"),
    ("solutionDisplay.creatingCheatSheet", "Creating your cheat sheet..."),
    ("solutionDisplay.practiceProblems", "Practice Problems"),
    (
        "solutionDisplay.generatingPracticeProblems",
        "Generating practice problems...",
    ),
    ("sketchDisplay.creating", "Creating your sketch..."),
    ("sketchDisplay.creatingHint", "This can take a few seconds."),
    ("sketchDisplay.errorTitle", "Could Not Generate Sketch"),
    ("sketchDisplay.placeholderTitle", "Your sketch will appear here"),
    ("sketchDisplay.editTitle", "Edit your sketch"),
    ("sketchDisplay.saved", "Sketch saved to"),
    ("scheduleDisplay.planning", "Planning your schedule..."),
    ("scheduleDisplay.planningHint", "This may take a moment."),
    ("scheduleDisplay.errorTitle", "Could Not Generate Schedule"),
    ("scheduleDisplay.placeholderTitle", "Your schedule will appear here"),
    ("scheduleDisplay.weeklyPlan", "Your Weekly Plan"),
    ("scheduleDisplay.noEvents", "No events scheduled for today."),
    ("tutorDisplay.placeholderTitle", "AI Tutor"),
    (
        "tutorDisplay.placeholderText",
        "Start a conversation to get help with your homework, explain concepts, or practice problems.",
    ),
    ("chart.renderError", "Could not render the chart due to an error in the data."),
    ("chart.pending", "Receiving chart..."),
    (
        "addModal.validationAlert",
        "Please fill in at least the time and title for the event.",
    ),
    ("errors.noPrompt", "Please enter a question or upload an image."),
    ("errors.noSketchPrompt", "Please describe the sketch you want to create."),
    ("errors.noEditPrompt", "Please describe how you want to edit the sketch."),
    ("errors.noSketchToEdit", "There is no sketch to edit."),
    (
        "errors.noSchedulePrompt",
        "Please describe the schedule you want to create.",
    ),
    ("errors.noSchedule", "Generate a schedule first."),
    ("errors.noSolution", "Solve a problem first."),
    (
        "disclaimer.accuracy",
        "AI-generated answers may be inaccurate. Please verify important information.",
    ),
];

const RU: Catalog = &[
    ("header.title", "Studymate"),
    ("modes.solver", "Решатель"),
    ("modes.sketcher", "Эскиз"),
    ("modes.scheduler", "Планировщик"),
    ("modes.tutor", "Репетитор"),
    ("buttons.solving", "Решение..."),
    ("buttons.sketching", "Создание..."),
    ("buttons.planning", "Планирование..."),
    ("buttons.replying", "Отвечаю..."),
    ("buttons.applying", "Применение..."),
    ("buttons.addEvent", "Добавить событие"),
    ("buttons.cheatSheet", "Шпаргалка"),
    ("buttons.creating", "Создание..."),
    ("buttons.practice", "Практика"),
    ("buttons.generating", "Генерация..."),
    (
        "homeworkInput.solverPlaceholder",
        "Введите ваш вопрос... например, 'Что такое теорема Пифагора?'",
    ),
    (
        "homeworkInput.sketcherPlaceholder",
        "Опишите эскиз, который вы хотите создать... например, 'Простая диаграмма растительной клетки'",
    ),
    (
        "homeworkInput.schedulerPlaceholder",
        "Опишите вашу неделю... например, 'У меня занятия пн/ср/пт с 9 до 11, работа вт/чт вечерами, и нужно готовиться к экзамену по истории.'",
    ),
    (
        "homeworkInput.tutorPlaceholder",
        "Задайте вопрос, чтобы начать занятие...",
    ),
    ("solutionDisplay.generating", "Генерация решения..."),
    ("solutionDisplay.generatingHint", "Это может занять некоторое время."),
    ("solutionDisplay.errorTitle", "Произошла ошибка"),
    ("solutionDisplay.placeholderTitle", "Ваше решение появится здесь"),
    ("solutionDisplay.solution", "Решение"),
    ("solutionDisplay.creatingCheatSheet", "Создание шпаргалки..."),
    ("solutionDisplay.practiceProblems", "Практические задачи"),
    (
        "solutionDisplay.generatingPracticeProblems",
        "Генерация практических задач...",
    ),
    ("sketchDisplay.creating", "Создание вашего эскиза..."),
    ("sketchDisplay.creatingHint", "Это может занять несколько секунд."),
    ("sketchDisplay.errorTitle", "Не удалось создать эскиз"),
    ("sketchDisplay.placeholderTitle", "Ваш эскиз появится здесь"),
    ("sketchDisplay.editTitle", "Редактировать ваш эскиз"),
    ("sketchDisplay.saved", "Эскиз сохранён в"),
    ("scheduleDisplay.planning", "Планирование вашего расписания..."),
    ("scheduleDisplay.planningHint", "Это может занять некоторое время."),
    ("scheduleDisplay.errorTitle", "Не удалось создать расписание"),
    ("scheduleDisplay.placeholderTitle", "Ваше расписание появится здесь"),
    ("scheduleDisplay.weeklyPlan", "Ваш план на неделю"),
    ("scheduleDisplay.noEvents", "На сегодня событий не запланировано."),
    ("tutorDisplay.placeholderTitle", "ИИ-Репетитор"),
    (
        "tutorDisplay.placeholderText",
        "Начните диалог, чтобы получить помощь с домашним заданием, объяснение концепций или попрактиковаться.",
    ),
    ("chart.renderError", "Не удалось отобразить график из-за ошибки в данных."),
    (
        "addModal.validationAlert",
        "Пожалуйста, укажите хотя бы время и название события.",
    ),
    ("errors.noPrompt", "Пожалуйста, введите вопрос или загрузите изображение."),
    (
        "errors.noSketchPrompt",
        "Пожалуйста, опишите эскиз, который вы хотите создать.",
    ),
    (
        "errors.noEditPrompt",
        "Пожалуйста, опишите, как вы хотите отредактировать эскиз.",
    ),
    ("errors.noSketchToEdit", "Нет эскиза для редактирования."),
    (
        "errors.noSchedulePrompt",
        "Пожалуйста, опишите расписание, которое вы хотите создать.",
    ),
    (
        "disclaimer.accuracy",
        "Ответы, сгенерированные ИИ, могут быть неточными. Пожалуйста, проверяйте важную информацию.",
    ),
];
