use std::borrow::Cow;

use crate::models::{Locator, LocatorStrategy};

use super::statement::Statement;

/// How interpolated values (locator expressions, typed text, the target
/// URL) are placed into generated Java string literals.
///
/// `Raw` performs no escaping at all: a value containing `"` produces
/// syntactically broken Java. This is the canonical default, kept
/// deliberately so output stays byte-for-byte predictable; `JavaString`
/// is the hardening option behind the same seam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscapePolicy {
    #[default]
    Raw,
    JavaString,
}

impl EscapePolicy {
    pub fn escape<'a>(&self, raw: &'a str) -> Cow<'a, str> {
        match self {
            EscapePolicy::Raw => Cow::Borrowed(raw),
            EscapePolicy::JavaString => {
                if raw.contains(['\\', '"']) {
                    Cow::Owned(raw.replace('\\', "\\\\").replace('"', "\\\""))
                } else {
                    Cow::Borrowed(raw)
                }
            }
        }
    }
}

/// Renders a statement list to a self-contained Selenium Java class.
/// Every action statement is preceded by an explicit readiness wait with
/// a fixed timeout: clickable for clicks, visible for text entry.
#[derive(Debug, Clone)]
pub struct JavaRenderer {
    class_name: String,
    wait_timeout_secs: u32,
    escape: EscapePolicy,
}

impl JavaRenderer {
    pub fn new() -> Self {
        Self {
            class_name: "TestCase".to_string(),
            wait_timeout_secs: 10,
            escape: EscapePolicy::default(),
        }
    }

    pub fn with_escape_policy(mut self, escape: EscapePolicy) -> Self {
        self.escape = escape;
        self
    }

    pub fn file_name(&self) -> String {
        format!("{}.java", self.class_name)
    }

    /// Render preamble, one wait-then-act statement per entry, postamble.
    pub fn render(&self, target_url: &str, statements: &[Statement]) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            r#"
import java.time.Duration;
import org.openqa.selenium.By;
import org.openqa.selenium.WebDriver;
import org.openqa.selenium.chrome.ChromeDriver;
import org.openqa.selenium.support.ui.ExpectedConditions;
import org.openqa.selenium.support.ui.WebDriverWait;

public class {} {{

    public static void main(String[] args) {{

        WebDriver driver = new ChromeDriver();
        WebDriverWait wait = new WebDriverWait(driver, Duration.ofSeconds({}));
        driver.manage().window().maximize();
        driver.get("{}");
"#,
            self.class_name,
            self.wait_timeout_secs,
            self.escape.escape(target_url)
        ));

        for statement in statements {
            match statement {
                Statement::WaitAndClick { locator } => {
                    out.push_str(&format!(
                        "\n        wait.until(ExpectedConditions.elementToBeClickable({})).click();\n",
                        self.by(locator)
                    ));
                }
                Statement::WaitAndType { locator, value } => {
                    out.push_str(&format!(
                        "\n        wait.until(ExpectedConditions.visibilityOfElementLocated({})).sendKeys(\"{}\");\n",
                        self.by(locator),
                        self.escape.escape(value)
                    ));
                }
            }
        }

        out.push_str("\n        driver.quit();\n    }\n}\n");

        out
    }

    fn by(&self, locator: &Locator) -> String {
        let expression = self.escape.escape(&locator.expression);
        match locator.strategy {
            LocatorStrategy::Css => format!("By.cssSelector(\"{}\")", expression),
            LocatorStrategy::Xpath => format!("By.xpath(\"{}\")", expression),
        }
    }
}

impl Default for JavaRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Locator;

    fn click(expr: &str) -> Statement {
        Statement::WaitAndClick {
            locator: Locator::css(expr),
        }
    }

    #[test]
    fn renders_click_then_type_in_order() {
        let statements = vec![
            click("#submit"),
            Statement::WaitAndType {
                locator: Locator::css("input[name='q']"),
                value: "hello".to_string(),
            },
        ];

        let source = JavaRenderer::new().render("https://example.com", &statements);

        let click_pos = source
            .find("wait.until(ExpectedConditions.elementToBeClickable(By.cssSelector(\"#submit\"))).click();")
            .expect("click statement present");
        let type_pos = source
            .find("wait.until(ExpectedConditions.visibilityOfElementLocated(By.cssSelector(\"input[name='q']\"))).sendKeys(\"hello\");")
            .expect("type statement present");
        assert!(click_pos < type_pos, "statements must keep log order");
        assert!(source.contains("driver.get(\"https://example.com\");"));
        assert!(source.contains("driver.quit();"));
    }

    #[test]
    fn empty_statement_list_yields_preamble_and_postamble_only() {
        let source = JavaRenderer::new().render("https://example.com", &[]);

        assert!(source.contains("WebDriver driver = new ChromeDriver();"));
        assert!(source.contains("driver.get(\"https://example.com\");"));
        assert!(source.contains("driver.quit();"));
        assert!(!source.contains("wait.until(ExpectedConditions.elementToBeClickable"));
        assert!(!source.contains("sendKeys"));
    }

    #[test]
    fn xpath_locators_use_by_xpath() {
        let statements = vec![Statement::WaitAndClick {
            locator: Locator::xpath("//a[contains(text(),'Next')]"),
        }];

        let source = JavaRenderer::new().render("https://example.com", &statements);
        assert!(source.contains("By.xpath(\"//a[contains(text(),'Next')]\")"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let statements = vec![
            click("#a"),
            Statement::WaitAndType {
                locator: Locator::css("#b"),
                value: "text".to_string(),
            },
        ];

        let first = JavaRenderer::new().render("https://example.com", &statements);
        let second = JavaRenderer::new().render("https://example.com", &statements);
        assert_eq!(first, second);
    }

    #[test]
    fn raw_policy_leaves_delimiters_untouched() {
        // The hazard is observable: a double quote in the typed value
        // passes straight through and breaks the generated literal.
        let statements = vec![Statement::WaitAndType {
            locator: Locator::css("#field"),
            value: "say \"hi\"".to_string(),
        }];

        let source = JavaRenderer::new().render("https://example.com", &statements);
        assert!(source.contains("sendKeys(\"say \"hi\"\");"));
    }

    #[test]
    fn java_string_policy_escapes_quotes_and_backslashes() {
        let statements = vec![Statement::WaitAndType {
            locator: Locator::css("#field"),
            value: "say \"hi\"\\now".to_string(),
        }];

        let source = JavaRenderer::new()
            .with_escape_policy(EscapePolicy::JavaString)
            .render("https://example.com", &statements);
        assert!(source.contains("sendKeys(\"say \\\"hi\\\"\\\\now\");"));
    }

    #[test]
    fn escape_policy_raw_is_identity() {
        assert_eq!(EscapePolicy::Raw.escape("a\"b\\c"), "a\"b\\c");
    }
}
