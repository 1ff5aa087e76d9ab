//! Line-oriented terminal front end.
//!
//! Renders the root view as text and maps typed commands onto the screen
//! controllers. Screens are rebuilt whenever the root view changes, so the
//! session (not the console) decides which flow is mounted.

use std::io;
use std::sync::Arc;

use alumni_common::{messages, FormError, UserProfile};
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::app::App;
use crate::profile::ProfileRepository;
use crate::provider::IdentityProvider;
use crate::router::{RootView, Screen};
use crate::screens::{
    confirm_and_sign_out, Alert, ConfirmPrompt, EditProfileScreen, HomeScreen, LoginScreen, LogoutOutcome,
    Prompt, PromptChoice, RegisterScreen,
};
use crate::splash::{FadeIn, SplashView};

enum Active {
    Splash,
    Login(LoginScreen),
    Register(RegisterScreen),
    Home(HomeScreen),
    EditProfile(EditProfileScreen),
}

pub struct Console<R, W> {
    input: Mutex<Lines<R>>,
    output: Mutex<W>,
    identity: Arc<dyn IdentityProvider>,
    profiles: ProfileRepository,
    splash: SplashView,
}

impl Console<BufReader<Stdin>, Stdout> {
    pub fn stdio(identity: Arc<dyn IdentityProvider>, profiles: ProfileRepository, splash: SplashView) -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), identity, profiles, splash)
    }
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(
        input: R,
        output: W,
        identity: Arc<dyn IdentityProvider>,
        profiles: ProfileRepository,
        splash: SplashView,
    ) -> Self {
        Self {
            input: Mutex::new(input.lines()),
            output: Mutex::new(output),
            identity,
            profiles,
            splash,
        }
    }

    pub fn into_output(self) -> W {
        self.output.into_inner()
    }

    /// Run until `quit`, end of input or the root stopping.
    pub async fn run(&self, app: &App) -> io::Result<()> {
        let mut views = app.views();
        let mut active = Active::Splash;

        let initial = views.borrow_and_update().clone();
        self.enter(&initial, &mut active).await?;
        let mut fade = matches!(initial, RootView::Splash).then(FadeIn::start);

        loop {
            let frame_due = fade.map_or_else(Instant::now, |f| f.next_frame());

            tokio::select! {
                _ = tokio::time::sleep_until(frame_due), if fade.is_some() => {
                    if let Some(clock) = fade.as_mut() {
                        let (frame, opacity) = clock.advance(&self.splash);
                        self.say(&frame).await?;
                        if opacity >= 1.0 {
                            self.say(self.splash.loading_text).await?;
                            fade = None;
                        }
                    }
                }

                changed = views.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let view = views.borrow_and_update().clone();
                    self.enter(&view, &mut active).await?;
                    fade = matches!(view, RootView::Splash).then(FadeIn::start);
                }

                line = self.read_line() => {
                    let Some(line) = line? else { break };
                    if !self.handle(line.trim(), app, &mut active).await? {
                        break;
                    }
                }
            }
        }

        tracing::debug!("Console finished");
        Ok(())
    }

    /// Mount the screen for `view`.
    async fn enter(&self, view: &RootView, active: &mut Active) -> io::Result<()> {
        let previous = std::mem::replace(active, Active::Splash);

        *active = match view {
            // Branding frames are drawn by the fade-in clock in `run`.
            RootView::Splash => Active::Splash,
            RootView::Unauthenticated(Screen::Register) => {
                let text = format!("== {} ==\n{}", messages::REGISTER_TITLE, messages::REGISTER_SUBTITLE);
                self.say(&text).await?;
                self.help(Screen::Register).await?;
                Active::Register(RegisterScreen::new(self.identity.clone(), self.profiles.clone()))
            }
            RootView::Unauthenticated(_) => {
                self.say(&format!("== {} ==", messages::LOGIN_TITLE)).await?;
                self.help(Screen::Login).await?;
                Active::Login(LoginScreen::new(self.identity.clone()))
            }
            RootView::Authenticated {
                screen: Screen::EditProfile,
                ..
            } => {
                let editor = match previous {
                    Active::Home(home) => home.open_editor(),
                    _ => EditProfileScreen::new(self.identity.clone(), self.profiles.clone(), UserProfile::default()),
                };
                self.render_editor(&editor).await?;
                Active::EditProfile(editor)
            }
            RootView::Authenticated { .. } => {
                let mut home = HomeScreen::new(self.identity.clone(), self.profiles.clone());
                self.say(messages::LOADING).await?;
                home.mount().await;
                self.render_home(&home).await?;
                Active::Home(home)
            }
        };
        Ok(())
    }

    /// Apply one command line. Returns `false` to stop.
    async fn handle(&self, line: &str, app: &App, active: &mut Active) -> io::Result<bool> {
        let (command, rest) = match line.split_once(' ') {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "" => return Ok(true),
            "quit" | "salir" => return Ok(false),
            _ => {}
        }

        match active {
            Active::Splash => self.say(messages::LOADING).await?,

            Active::Login(screen) => match command {
                "set" => self.set_field(rest, |f, v| screen.form_mut().set(f, v)).await?,
                "submit" => {
                    if let Err(e) = screen.submit().await {
                        self.alert(&Alert::error(&e)).await?;
                    }
                }
                "register" => app.navigate(Screen::Register),
                "help" => self.help(Screen::Login).await?,
                other => self.unknown(other).await?,
            },

            Active::Register(screen) => match command {
                "set" => self.set_field(rest, |f, v| screen.form_mut().set(f, v)).await?,
                "submit" => match screen.submit().await {
                    Ok(_) => self.alert(&Alert::success(messages::REGISTER_SUCCEEDED)).await?,
                    Err(e) => self.alert(&Alert::error(&e)).await?,
                },
                "back" => app.go_back(),
                "help" => self.help(Screen::Register).await?,
                other => self.unknown(other).await?,
            },

            Active::Home(home) => match command {
                "refresh" => {
                    home.refresh().await;
                    self.render_home(home).await?;
                }
                "edit" => app.navigate(Screen::EditProfile),
                "logout" => match confirm_and_sign_out(self.identity.as_ref(), self).await {
                    Ok(LogoutOutcome::Cancelled) | Ok(LogoutOutcome::SignedOut) => {}
                    Err(e) => self.alert(&Alert::error(&e)).await?,
                },
                "help" => self.help(Screen::Home).await?,
                other => self.unknown(other).await?,
            },

            Active::EditProfile(editor) => match command {
                "set" => self.set_field(rest, |f, v| editor.form_mut().set(f, v)).await?,
                "submit" => match editor.submit().await {
                    Ok(_) => {
                        self.alert(&Alert::success(messages::UPDATE_SUCCEEDED)).await?;
                        app.go_back();
                    }
                    Err(e) => self.alert(&Alert::error(&e)).await?,
                },
                "cancel" => {
                    editor.cancel();
                    app.go_back();
                }
                "help" => self.help(Screen::EditProfile).await?,
                other => self.unknown(other).await?,
            },
        }
        Ok(true)
    }

    async fn set_field<F>(&self, rest: &str, set: F) -> io::Result<()>
    where
        F: FnOnce(&str, &str) -> Result<(), FormError>,
    {
        let (field, value) = rest.split_once(' ').unwrap_or((rest, ""));
        if field.is_empty() {
            return self.say("Uso: set <campo> <valor>").await;
        }
        match set(field, value.trim()) {
            Ok(()) => Ok(()),
            Err(e) => self.say(&e.to_string()).await,
        }
    }

    async fn render_home(&self, home: &HomeScreen) -> io::Result<()> {
        let card = home.card();
        let text = format!(
            "{}\n{}\n{}\n-- {} --\n{}: {}\n{}: {}\n{}: {}",
            messages::WELCOME,
            card.greeting_name,
            card.email,
            messages::PROFILE_CARD_TITLE,
            messages::LABEL_ACADEMIC_TITLE,
            card.academic_title,
            messages::LABEL_GRADUATION_YEAR,
            card.graduation_year,
            messages::LABEL_REGISTERED_ON,
            card.registered_on,
        );
        self.say(&text).await
    }

    async fn render_editor(&self, editor: &EditProfileScreen) -> io::Result<()> {
        let form = editor.form();
        let text = format!(
            "== {} ==\n{}\nnombre: {}\n{}: {}\ntituloUniversitario: {}\nanoGraduacion: {}",
            messages::EDIT_TITLE,
            messages::EDIT_SUBTITLE,
            form.name,
            messages::LABEL_EMAIL,
            editor.email(),
            form.academic_title,
            form.graduation_year,
        );
        self.say(&text).await?;
        self.help(Screen::EditProfile).await
    }

    async fn help(&self, screen: Screen) -> io::Result<()> {
        let commands = match screen {
            Screen::Login => "set email|password <valor>, submit, register, quit",
            Screen::Register => {
                "set nombre|email|password|confirmPassword|tituloUniversitario|anoGraduacion <valor>, submit, back, quit"
            }
            Screen::Home => "refresh, edit, logout, quit",
            Screen::EditProfile => "set nombre|tituloUniversitario|anoGraduacion <valor>, submit, cancel, quit",
        };
        self.say(&format!("Comandos: {}", commands)).await
    }

    async fn alert(&self, alert: &Alert) -> io::Result<()> {
        self.say(&format!("[{}] {}", alert.title, alert.message)).await
    }

    async fn unknown(&self, command: &str) -> io::Result<()> {
        self.say(&format!("Comando desconocido: {}", command)).await
    }

    async fn say(&self, text: &str) -> io::Result<()> {
        let mut output = self.output.lock().await;
        output.write_all(text.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await
    }

    async fn read_line(&self) -> io::Result<Option<String>> {
        self.input.lock().await.next_line().await
    }
}

#[async_trait]
impl<R, W> ConfirmPrompt for Console<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn confirm(&self, prompt: &Prompt) -> PromptChoice {
        let text = format!(
            "{}\n{}\n  1) {}\n  2) {}",
            prompt.title, prompt.message, prompt.cancel_label, prompt.confirm_label
        );
        if let Err(e) = self.say(&text).await {
            tracing::warn!("Failed to show prompt: {}", e);
            return PromptChoice::Cancel;
        }

        match self.read_line().await {
            Ok(Some(answer)) => parse_choice(&answer, prompt),
            Ok(None) => PromptChoice::Cancel,
            Err(e) => {
                tracing::warn!("Failed to read prompt answer: {}", e);
                PromptChoice::Cancel
            }
        }
    }
}

fn parse_choice(answer: &str, prompt: &Prompt) -> PromptChoice {
    let answer = answer.trim();
    if answer == "2" || answer.eq_ignore_ascii_case(prompt.confirm_label) {
        PromptChoice::Confirm
    } else {
        PromptChoice::Cancel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{MemoryIdentity, MemoryStore};
    use std::time::Duration;
    use tokio::io::{duplex, AsyncWriteExt as _};

    fn console_over<R>(input: R, identity: Arc<MemoryIdentity>, store: Arc<MemoryStore>) -> Console<R, Vec<u8>>
    where
        R: AsyncBufRead + Unpin + Send,
    {
        Console::new(input, Vec::new(), identity, ProfileRepository::new(store), SplashView::default())
    }

    #[test]
    fn test_parse_choice() {
        let prompt = Prompt::logout();
        assert_eq!(parse_choice("2", &prompt), PromptChoice::Confirm);
        assert_eq!(parse_choice(" cerrar sesión ", &prompt), PromptChoice::Cancel);
        assert_eq!(parse_choice("Cerrar Sesión", &prompt), PromptChoice::Confirm);
        assert_eq!(parse_choice("1", &prompt), PromptChoice::Cancel);
        assert_eq!(parse_choice("", &prompt), PromptChoice::Cancel);
    }

    #[tokio::test]
    async fn test_confirm_reads_answer() {
        let console = console_over(
            &b"2\n"[..],
            Arc::new(MemoryIdentity::new()),
            Arc::new(MemoryStore::new()),
        );
        assert_eq!(console.confirm(&Prompt::logout()).await, PromptChoice::Confirm);
        // End of input answers "cancel".
        assert_eq!(console.confirm(&Prompt::logout()).await, PromptChoice::Cancel);

        let output = String::from_utf8(console.into_output()).unwrap();
        assert!(output.contains("¿Estás seguro que deseas cerrar sesión?"));
        assert!(output.contains("1) Cancelar"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_register_then_logout_session() {
        let identity = Arc::new(MemoryIdentity::new());
        let store = Arc::new(MemoryStore::new());
        let app = App::start(identity.clone(), Duration::from_millis(3000));

        let (mut keyboard, input) = duplex(4096);
        let console = console_over(BufReader::new(input), identity.clone(), store.clone());

        let script = async {
            let steps: &[&str] = &[
                "register",
                "set nombre Ana",
                "set email a@x.com",
                "set password 123456",
                "set confirmPassword 123456",
                "set tituloUniversitario Ing.",
                "set anoGraduacion 2020",
                "submit",
                "logout",
                "2",
                "quit",
            ];
            tokio::time::sleep(Duration::from_millis(3100)).await;
            for step in steps {
                keyboard.write_all(format!("{}\n", step).as_bytes()).await.unwrap();
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        };

        let (result, _) = tokio::join!(console.run(&app), script);
        result.unwrap();
        app.shutdown().await;

        let output = String::from_utf8(console.into_output()).unwrap();
        assert!(output.starts_with("\x1b[38;5;232mMi Aplicación\nInstituto Técnico Ricaldone"));
        assert!(output.contains("\x1b[38;5;255mMi Aplicación\nInstituto Técnico Ricaldone\x1b[0m\nCargando..."));
        assert!(output.contains("== Crear Cuenta =="));
        assert!(output.contains("[Éxito] Usuario registrado correctamente"));
        assert!(output.contains("¡Bienvenido!\nAna\na@x.com"));
        assert!(output.contains("Año de Graduación: 2020"));
        assert!(identity.current_account().is_none());
        assert_eq!(store.len().await, 1);
    }

    fn shades(output: &str) -> Vec<u8> {
        output
            .split("\x1b[38;5;")
            .skip(1)
            .filter_map(|frame| frame.split_once('m'))
            .filter_map(|(shade, _)| shade.parse().ok())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_splash_fades_in_then_holds() {
        let identity = Arc::new(MemoryIdentity::new());
        let app = App::start(identity.clone(), Duration::from_millis(3000));

        let (mut keyboard, input) = duplex(64);
        let console = Console::new(
            BufReader::new(input),
            Vec::new(),
            identity,
            ProfileRepository::new(Arc::new(MemoryStore::new())),
            SplashView::new(Duration::from_millis(1000)),
        );

        let script = async {
            tokio::time::sleep(Duration::from_millis(2500)).await;
            keyboard.write_all(b"quit\n").await.unwrap();
        };

        let (result, _) = tokio::join!(console.run(&app), script);
        result.unwrap();
        app.shutdown().await;

        let output = String::from_utf8(console.into_output()).unwrap();
        let frames = shades(&output);
        assert_eq!(frames.len(), 11);
        assert_eq!(frames.first(), Some(&232));
        assert_eq!(frames.last(), Some(&255));
        assert!(frames.windows(2).all(|w| w[0] <= w[1]));

        // Later frames redraw in place; nothing is drawn once fully visible.
        assert_eq!(output.matches("\x1b[2F").count(), 10);
        let (_, after) = output.split_once("Cargando...").unwrap();
        assert!(!after.contains("\x1b[38;5;"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_splash_without_fade_draws_once() {
        let identity = Arc::new(MemoryIdentity::new());
        let app = App::start(identity.clone(), Duration::from_millis(3000));

        let (mut keyboard, input) = duplex(64);
        let console = Console::new(
            BufReader::new(input),
            Vec::new(),
            identity,
            ProfileRepository::new(Arc::new(MemoryStore::new())),
            SplashView::new(Duration::ZERO),
        );

        let script = async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            keyboard.write_all(b"quit\n").await.unwrap();
        };

        let (result, _) = tokio::join!(console.run(&app), script);
        result.unwrap();
        app.shutdown().await;

        let output = String::from_utf8(console.into_output()).unwrap();
        assert_eq!(
            output,
            "\x1b[38;5;255mMi Aplicación\nInstituto Técnico Ricaldone\x1b[0m\nCargando...\n"
        );
    }
}
