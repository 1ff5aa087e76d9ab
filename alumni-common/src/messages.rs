//! User-facing text shown by the client.
//!
//! The application ships in Spanish; every alert title and message the
//! screens can surface lives here so the catalogue can be reviewed in one
//! place.

pub const TITLE_ERROR: &str = "Error";
pub const TITLE_SUCCESS: &str = "Éxito";
pub const TITLE_LOGOUT: &str = "Cerrar Sesión";

// Validation
pub const ALL_FIELDS_REQUIRED: &str = "Todos los campos son obligatorios";
pub const PASSWORDS_DO_NOT_MATCH: &str = "Las contraseñas no coinciden";
pub const PASSWORD_TOO_SHORT: &str = "La contraseña debe tener al menos 6 caracteres";
pub const INVALID_GRADUATION_YEAR: &str = "Año de graduación inválido";

// Provider failures
pub const EMAIL_ALREADY_IN_USE: &str = "Este correo electrónico ya está registrado";
pub const INVALID_EMAIL: &str = "Correo electrónico inválido";
pub const WEAK_PASSWORD: &str = "La contraseña es muy débil";
pub const INVALID_CREDENTIALS: &str = "Correo electrónico o contraseña incorrectos";
pub const TOO_MANY_REQUESTS: &str = "Demasiados intentos. Intenta más tarde";
pub const REGISTER_FAILED: &str = "Error al registrar usuario";
pub const UPDATE_FAILED: &str = "No se pudo actualizar la información";
pub const SIGN_OUT_FAILED: &str = "No se pudo cerrar la sesión";
pub const REQUEST_IN_PROGRESS: &str = "Ya hay una solicitud en curso";

// Success
pub const REGISTER_SUCCEEDED: &str = "Usuario registrado correctamente";
pub const UPDATE_SUCCEEDED: &str = "Información actualizada correctamente";

// Prompts
pub const LOGOUT_CONFIRMATION: &str = "¿Estás seguro que deseas cerrar sesión?";
pub const OPTION_CANCEL: &str = "Cancelar";
pub const OPTION_LOGOUT: &str = "Cerrar Sesión";

// Placeholders
pub const NAME_PLACEHOLDER: &str = "Usuario";
pub const UNSPECIFIED: &str = "No especificado";
pub const UNAVAILABLE: &str = "No disponible";
pub const LOADING: &str = "Cargando...";

// Splash branding
pub const APP_TITLE: &str = "Mi Aplicación";
pub const APP_SUBTITLE: &str = "Instituto Técnico Ricaldone";

// Screen titles and labels
pub const WELCOME: &str = "¡Bienvenido!";
pub const PROFILE_CARD_TITLE: &str = "Mi Información";
pub const LOGIN_TITLE: &str = "Iniciar Sesión";
pub const REGISTER_TITLE: &str = "Crear Cuenta";
pub const REGISTER_SUBTITLE: &str = "Completa todos los campos";
pub const EDIT_TITLE: &str = "Editar Perfil";
pub const EDIT_SUBTITLE: &str = "Actualiza tu información";
pub const LABEL_EMAIL: &str = "Correo electrónico";
pub const LABEL_ACADEMIC_TITLE: &str = "Título Universitario";
pub const LABEL_GRADUATION_YEAR: &str = "Año de Graduación";
pub const LABEL_REGISTERED_ON: &str = "Fecha de Registro";
