use async_graphql::ErrorExtensions;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Identificador inválido: '{0}'")]
    InvalidId(String),

    #[error("Já existe uma contraparte com este INN")]
    InnAlreadyExists,

    #[error("Já existe uma contraparte com este e-mail")]
    EmailAlreadyExists,

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    // Linha do banco que não pôde ser convertida (status desconhecido)
    #[error("Registro inválido no banco: {0}")]
    CorruptRow(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Código estável exposto ao cliente em `extensions.code`.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidId(_) => "BAD_USER_INPUT",
            AppError::InnAlreadyExists
            | AppError::EmailAlreadyExists
            | AppError::UniqueConstraintViolation(_) => "CONFLICT",
            AppError::CorruptRow(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_) => "INTERNAL",
        }
    }

    fn is_internal(&self) -> bool {
        self.code() == "INTERNAL"
    }

    /// Mensagem segura para o cliente. Detalhes internos vão só para o log.
    fn public_message(&self) -> String {
        if self.is_internal() {
            tracing::error!("Erro Interno do Servidor: {:?}", self);
            "Ocorreu um erro inesperado.".to_string()
        } else {
            self.to_string()
        }
    }

    /// Converte violações de chave única nos erros de domínio correspondentes.
    pub(crate) fn from_write(e: sqlx::Error) -> Self {
        if let Some(db_err) = e.as_database_error() {
            if db_err.is_unique_violation() {
                return match db_err.constraint() {
                    Some(c) if c.contains("inn") => AppError::InnAlreadyExists,
                    Some(c) if c.contains("email") => AppError::EmailAlreadyExists,
                    Some(c) => AppError::UniqueConstraintViolation(c.to_string()),
                    None => AppError::UniqueConstraintViolation(db_err.message().to_string()),
                };
            }
        }
        e.into()
    }
}

impl ErrorExtensions for AppError {
    fn extend(&self) -> async_graphql::Error {
        let code = self.code();
        async_graphql::Error::new(self.public_message()).extend_with(|_, ext| ext.set("code", code))
    }
}
