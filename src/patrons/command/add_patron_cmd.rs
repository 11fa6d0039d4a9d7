use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::library::Role;
use crate::patrons::dto::PatronDto;
use crate::core::command::{Command, CommandError};
use crate::patrons::domain::PatronService;

pub(crate) struct AddPatronCommand {
    patron_service: Box<dyn PatronService>,
}

impl AddPatronCommand {
    pub(crate) fn new(patron_service: Box<dyn PatronService>) -> Self {
        Self {
            patron_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddPatronCommandRequest {
    pub username: String,
    #[serde(default)]
    pub role: Option<Role>,
}

impl AddPatronCommandRequest {
    pub fn new(username: &str, role: Option<Role>) -> Self {
        Self {
            username: username.to_string(),
            role,
        }
    }
    pub fn build_patron(&self) -> PatronDto {
        PatronDto::new(self.username.as_str(), self.role.unwrap_or(Role::Member))
    }
}


#[derive(Debug, Serialize)]
pub(crate) struct AddPatronCommandResponse {
    pub patron: PatronDto,
}

impl AddPatronCommandResponse {
    pub fn new(patron: PatronDto) -> Self {
        Self {
            patron,
        }
    }
}

#[async_trait]
impl Command<AddPatronCommandRequest, AddPatronCommandResponse> for AddPatronCommand {
    async fn execute(&self, req: AddPatronCommandRequest) -> Result<AddPatronCommandResponse, CommandError> {
        let patron = req.build_patron();
        self.patron_service.add_patron(&patron).await.map_err(CommandError::from).map(AddPatronCommandResponse::new)
    }
}
